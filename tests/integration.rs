#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use imgprep::{
        run_session, Discovery, Encoder, ImageProcessor, NativeEncoder, PrepError, ProcessConfig,
        RunConfig, SessionOutcome,
    };
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use std::path::Path;

    /// Writes `input size * percent / 100` bytes per level; listed levels fail.
    struct FakeEncoder {
        percent: fn(u8) -> u64,
        failing: Vec<u8>,
        calls: RefCell<Vec<(String, u8)>>,
    }

    impl FakeEncoder {
        fn new(percent: fn(u8) -> u64) -> Self {
            Self {
                percent,
                failing: Vec::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing_at(mut self, level: u8) -> Self {
            self.failing.push(level);
            self
        }
    }

    impl Encoder for FakeEncoder {
        fn encode(&self, input: &Path, output: &Path, level: u8) -> imgprep::Result<u64> {
            let name = input.file_name().unwrap().to_string_lossy().into_owned();
            self.calls.borrow_mut().push((name, level));
            if self.failing.contains(&level) {
                return Err(PrepError::Encoder(format!("level {} refused", level)));
            }
            let size = std::fs::metadata(input)?.len() * (self.percent)(level) / 100;
            std::fs::write(output, vec![level; size as usize])?;
            Ok(size)
        }
    }

    fn halving(level: u8) -> u64 {
        if level <= 2 {
            100
        } else {
            50
        }
    }

    fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.is_file())
            .map(|p| {
                (
                    p.file_name().unwrap().to_string_lossy().into_owned(),
                    std::fs::read(&p).unwrap(),
                )
            })
            .collect()
    }

    fn process(
        dir: &Path,
        prefix: Option<&str>,
        encoder: &dyn Encoder,
    ) -> imgprep::ProcessingStats {
        let run = RunConfig::new(dir, prefix.map(str::to_string));
        ImageProcessor::new(ProcessConfig::default(), encoder)
            .process(&run)
            .unwrap()
    }

    #[test]
    fn png_and_bmp_become_numbered_jpegs() {
        let temp = TempDir::new().unwrap();
        temp.child("photo.png").write_binary(&vec![1u8; 800 * 1024]).unwrap();
        temp.child("img.bmp").write_binary(&vec![2u8; 50 * 1024]).unwrap();

        let encoder = FakeEncoder::new(halving);
        let stats = process(temp.path(), Some("Site"), &encoder);

        let files = snapshot(temp.path());
        let names: Vec<_> = files.keys().cloned().collect();
        assert_eq!(names, vec!["Site1.jpg", "Site2.jpg"]);
        // sorted by name: img.jpg before photo.jpg
        assert!(files["Site1.jpg"].len() <= 50 * 1024);
        assert!(files["Site2.jpg"].len() <= 800 * 1024);
        assert_eq!(stats.converted, 2);
        assert_eq!(stats.compressed, 2);
        assert_eq!(stats.renamed, 2);
    }

    #[test]
    fn new_files_continue_existing_numbering() {
        let temp = TempDir::new().unwrap();
        temp.child("Blog3.jpg").write_binary(&vec![3u8; 40_000]).unwrap();
        temp.child("Blog5.jpg").write_binary(&vec![5u8; 40_000]).unwrap();
        temp.child("b-second.jpg").write_binary(b"second").unwrap();
        temp.child("a-first.jpg").write_binary(b"first").unwrap();

        let encoder = FakeEncoder::new(halving);
        process(temp.path(), Some("Blog"), &encoder);

        let files = snapshot(temp.path());
        assert_eq!(files.len(), 4);
        assert_eq!(files["Blog6.jpg"], b"first");
        assert_eq!(files["Blog7.jpg"], b"second");
        assert_eq!(files["Blog3.jpg"], vec![3u8; 40_000]);
        assert_eq!(files["Blog5.jpg"], vec![5u8; 40_000]);
        // named files are not recompressed, small files are never encoded
        assert!(encoder.calls.borrow().is_empty());
    }

    #[test]
    fn second_run_changes_nothing() {
        let temp = TempDir::new().unwrap();
        temp.child("cover.webp").write_binary(&vec![9u8; 120_000]).unwrap();
        temp.child("thumb.gif").write_binary(&vec![8u8; 4_000]).unwrap();
        temp.child("shot.jpeg").write_binary(&vec![7u8; 64_000]).unwrap();

        let encoder = FakeEncoder::new(halving);
        process(temp.path(), Some("Doc"), &encoder);
        let first = snapshot(temp.path());
        assert_eq!(first.len(), 3);
        assert!(first.keys().all(|name| name.starts_with("Doc")));

        let stats = process(temp.path(), Some("Doc"), &encoder);
        assert_eq!(snapshot(temp.path()), first);
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.compressed, 0);
        assert_eq!(stats.renamed, 0);
    }

    #[test]
    fn failed_conversion_keeps_original_and_continues() {
        let temp = TempDir::new().unwrap();
        temp.child("a.png").write_binary(b"aaa").unwrap();
        temp.child("b.gif").write_binary(b"bbb").unwrap();

        let encoder = FakeEncoder::new(halving).failing_at(2);
        let stats = process(temp.path(), None, &encoder);

        let files = snapshot(temp.path());
        assert_eq!(files.len(), 2);
        assert_eq!(files["a.png"], b"aaa");
        assert_eq!(files["b.gif"], b"bbb");
        assert_eq!(stats.conversion_failures, 2);
        assert_eq!(encoder.calls.borrow().len(), 2);
    }

    #[test]
    fn no_prefix_skips_renaming_only() {
        let temp = TempDir::new().unwrap();
        temp.child("hero.png").write_binary(&vec![1u8; 64_000]).unwrap();
        temp.child("Site1.jpg").write_binary(&vec![2u8; 64_000]).unwrap();

        let encoder = FakeEncoder::new(halving);
        let stats = process(temp.path(), None, &encoder);

        let files = snapshot(temp.path());
        let names: Vec<_> = files.keys().cloned().collect();
        assert_eq!(names, vec!["Site1.jpg", "hero.jpg"]);
        // without renaming, convention-looking names are compressed too
        assert_eq!(stats.compressed, 2);
        assert_eq!(files["hero.jpg"].len(), 32_000);
        assert_eq!(stats.renamed, 0);
    }

    #[test]
    fn compression_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        temp.child("big.jpg").write_binary(&vec![1u8; 200_000]).unwrap();
        temp.child("flat.jpg").write_binary(&vec![2u8; 50_000]).unwrap();
        temp.child("small.jpg").write_binary(&vec![3u8; 10_000]).unwrap();

        let encoder = FakeEncoder::new(halving).failing_at(23);
        let stats = process(temp.path(), None, &encoder);

        let files = snapshot(temp.path());
        let names: Vec<_> = files.keys().cloned().collect();
        assert_eq!(names, vec!["big.jpg", "flat.jpg", "small.jpg"]);
        assert_eq!(files["big.jpg"].len(), 100_000);
        assert_eq!(files["flat.jpg"].len(), 25_000);
        assert_eq!(files["small.jpg"], vec![3u8; 10_000]);
        assert_eq!(stats.skipped_small, 1);
        assert_eq!(stats.compression_failures, 1);
        // big.jpg gives up at the failing level, flat.jpg is under target size after one try
        let calls = encoder.calls.borrow().clone();
        assert_eq!(
            calls,
            vec![
                ("big.jpg".to_string(), 20),
                ("big.jpg".to_string(), 23),
                ("flat.jpg".to_string(), 20),
            ]
        );
    }

    #[test]
    fn discovery_session_and_pipeline_together() {
        let temp = TempDir::new().unwrap();
        let blog = temp.child("blog");
        blog.create_dir_all().unwrap();
        blog.child("z.png").write_binary(&vec![1u8; 30_000]).unwrap();
        blog.child("y.jpg").write_binary(&vec![1u8; 2_000]).unwrap();
        temp.child("docs").create_dir_all().unwrap();

        let targets = Discovery::new(temp.path()).discover().unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].label, "~/blog (2 files)");

        let mut out = Vec::new();
        let input = Cursor::new(&b"1\nY\nPost\n"[..]);
        let outcome = run_session(&targets, input, &mut out).unwrap();
        let run = match outcome {
            SessionOutcome::Run(run) => run,
            other => panic!("unexpected outcome: {:?}", other),
        };

        let encoder = FakeEncoder::new(halving);
        ImageProcessor::new(ProcessConfig::default(), &encoder)
            .process(&run)
            .unwrap();

        let names: Vec<_> = snapshot(blog.path()).keys().cloned().collect();
        assert_eq!(names, vec!["Post1.jpg", "Post2.jpg"]);
    }

    #[test]
    fn native_encoder_end_to_end() {
        let temp = TempDir::new().unwrap();

        // deterministic noise so the PNG is well over the size floor
        let mut seed: u32 = 0x1234_5678;
        let noisy = image::RgbImage::from_fn(192, 192, |_, _| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [r, g, b, _] = seed.to_le_bytes();
            image::Rgb([r, g, b])
        });
        noisy.save(temp.child("noise.png").path()).unwrap();
        image::RgbImage::from_pixel(8, 8, image::Rgb([10, 200, 30]))
            .save(temp.child("dot.bmp").path())
            .unwrap();

        let encoder = NativeEncoder::new();
        let stats = process(temp.path(), Some("Site"), &encoder);

        let files = snapshot(temp.path());
        let names: Vec<_> = files.keys().cloned().collect();
        assert_eq!(names, vec!["Site1.jpg", "Site2.jpg"]);
        for name in &names {
            let format = image::guess_format(&files[name]).unwrap();
            assert_eq!(format, image::ImageFormat::Jpeg);
        }
        assert_eq!(stats.converted, 2);
        assert!(stats.errors.is_empty());
    }
}
