use pystub::core::tag;
use pystub::version_line;

/// 模擬 python 執行檔：只印出版本字串。
/// No logging here, stdout and stderr must stay clean for callers
/// that capture the output.
fn main() {
    let result = version_line(tag::stamped_version()).and_then(|line| {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        line.write_to(&mut handle)
    });

    if let Err(e) = result {
        eprintln!("dummy-python: {}", e);
        std::process::exit(1);
    }
}
