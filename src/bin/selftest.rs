use memfs::{
    Filesystem, Mode,
    fs::{config::Config, error::Error},
};

fn usage() -> ! {
    eprintln!("selftest.memfs [--descriptors count]");
    std::process::exit(1);
}

fn report(name: &str, passed: bool) -> bool {
    println!("{name}: {}.", if passed { "PASSED" } else { "FAILED" });
    passed
}

fn test_directories(fs: &Filesystem) -> bool {
    let mut passed = true;

    passed &= fs.mkdir("fs/dir1").is_err();
    passed &= fs.mkdir("fs/dir1/dir3").is_err();
    passed &= fs.mkdir("dir4").is_ok();
    passed &= fs.mkdir("dir4") == Err(Error::AlreadyExists);
    passed &= fs.mkdir("dir4/dir6").is_ok();

    report("test_directories", passed)
}

fn test_files(fs: &Filesystem) -> bool {
    let mut passed = true;
    const TEXT: &[u8] = b"Hello, World!";

    let written = fs.open("dir4/doc1.txt", Mode::Write).and_then(|fd| {
        let count = fs.write(fd, TEXT)?;
        fs.close(fd)?;
        Ok(count)
    });
    passed &= written == Ok(TEXT.len());

    let mut buf = [0u8; 100];
    let read = fs.open("dir4/doc1.txt", Mode::Read).and_then(|fd| {
        let count = fs.read(fd, &mut buf)?;
        fs.close(fd)?;
        Ok(count)
    });
    passed &= read == Ok(TEXT.len());
    passed &= &buf[..TEXT.len()] == TEXT;

    passed &= fs.open("fs/dir1/dir3/doc1.txt", Mode::Read) == Err(Error::NotFound);
    passed &= fs.open("dir4/dir6", Mode::Read) == Err(Error::IsDir);

    let mut listing = String::new();
    passed &= fs.readdir("/", &mut listing).is_ok();
    passed &= fs.readdir("dir4", &mut listing).is_ok();
    print!("{listing}");

    report("test_files", passed)
}

fn test_descriptors(fs: &Filesystem) -> bool {
    let mut passed = true;

    let mut fds = Vec::new();
    while let Ok(fd) = fs.open("dir4/doc1.txt", Mode::Read) {
        fds.push(fd);
    }
    passed &= fs.available_descriptors() == 0;

    if let Some(&fd) = fds.first() {
        passed &= fs.close(fd).is_ok();
        passed &= fs.close(fd) == Err(Error::BadDescriptor);
        passed &= fs.open("dir4/doc1.txt", Mode::Read).is_ok_and(|fd| fs.close(fd).is_ok());
    }
    for &fd in fds.iter().skip(1) {
        passed &= fs.close(fd).is_ok();
    }
    passed &= fds.len() == fs.descriptor_capacity();
    passed &= fs.available_descriptors() == fs.descriptor_capacity();

    report("test_descriptors", passed)
}

fn main() {
    env_logger::init();

    let mut config = Config::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--descriptors" => {
                let Some(count) = args.next().and_then(|v| v.parse().ok()) else {
                    eprintln!("selftest.memfs: '--descriptors' expects a number");
                    usage();
                };
                config.max_descriptors = count;
            }
            _ => {
                eprintln!("selftest.memfs: unexpected argument '{arg}'");
                usage();
            }
        }
    }

    let fs = Filesystem::with_config(config);

    let mut passed = true;
    passed &= test_directories(&fs);
    passed &= test_files(&fs);
    passed &= test_descriptors(&fs);

    if !passed {
        std::process::exit(1);
    }
}
