use clap::Parser;
use pystub::config::manifest::Manifest;
use pystub::core::ops;
use pystub::utils::error::ErrorSeverity;
use pystub::utils::{logger, validation::Validate};
use pystub::{version_line, Cli, Command, Result, STUB_VERSION};
use std::path::Path;

fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::debug!("Starting pystub CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證參數
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&cli.command) {
        Ok(exit_code) => {
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,      // 警告，但成功
                ErrorSeverity::Medium => 2,   // 版本或標記不符
                ErrorSeverity::High => 1,     // 處理錯誤
                ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

fn run(command: &Command) -> Result<i32> {
    match command {
        Command::Print => run_print(),
        Command::Inspect { stub, json } => run_inspect(stub, *json),
        Command::Install {
            archive,
            stub,
            executable,
            force,
        } => run_install(archive, stub, executable, *force),
        Command::Verify {
            archive,
            executable,
            json,
        } => run_verify(archive, executable, *json),
        Command::Apply {
            manifest,
            stub,
            dry_run,
        } => run_apply(manifest, stub.as_deref(), *dry_run),
    }
}

/// stdout 只輸出版本字串，其他訊息都走 stderr
fn run_print() -> Result<i32> {
    let line = version_line(STUB_VERSION)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    line.write_to(&mut handle)?;
    Ok(0)
}

fn run_inspect(stub: &str, json: bool) -> Result<i32> {
    let report = ops::inspect_stub(Path::new(stub))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✅ {} carries version {}", report.path, report.version);
        match report.build {
            Some(build) => println!("📋 Upstream {} build {}", report.numpart, build),
            None => println!("📋 Upstream {} (no build number)", report.numpart),
        }
    }

    Ok(0)
}

fn run_install(archive: &str, stub: &str, executable: &str, force: bool) -> Result<i32> {
    let report = ops::install_stub(Path::new(archive), Path::new(stub), executable, force)?;

    tracing::info!("✅ Stub installed successfully!");
    println!("✅ Installed {} into {}", report.stub, report.archive);
    if report.forced {
        println!("⚠️ Version check skipped (--force)");
    } else if let (Some(stub_version), Some(runtime_version)) =
        (&report.stub_version, &report.runtime_version)
    {
        println!("📋 Stub {} matches runtime {}", stub_version, runtime_version);
    }

    Ok(0)
}

fn run_verify(archive: &str, executable: &str, json: bool) -> Result<i32> {
    let report = ops::verify_runtime(Path::new(archive), executable)?;
    let passed = report.passed();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if passed {
        println!(
            "✅ {} carries {} (runtime {})",
            report.archive,
            report.member,
            report.runtime_version
        );
    } else {
        println!("❌ Verification failed for {}", report.archive);
        if !report.member_present {
            println!("   {} is missing from the archive", report.member);
        }
        if let Some(tag_error) = &report.tag_error {
            println!("   {}", tag_error);
        }
        if let (Some(stub_version), Some(false)) = (&report.stub_version, report.version_match) {
            println!(
                "   stub {} does not match runtime {}",
                stub_version, report.runtime_version
            );
        }
    }

    Ok(if passed { 0 } else { 1 })
}

fn run_apply(manifest_path: &str, stub: Option<&str>, dry_run: bool) -> Result<i32> {
    let manifest = Manifest::from_file(manifest_path)?;
    manifest.validate()?;

    if dry_run {
        println!("📋 Plan for fixture '{}':", manifest.fixture.name);
        for entry in manifest.runtimes() {
            let stub_display = stub.or(entry.stub.as_deref()).unwrap_or("<unset>");
            println!(
                "   {} <- {} (member {})",
                entry.archive,
                stub_display,
                manifest.executable_for(entry)
            );
        }
        return Ok(0);
    }

    let report = ops::apply_manifest(&manifest, stub.map(Path::new))?;

    tracing::info!("✅ Manifest applied successfully!");
    println!(
        "✅ Fixture '{}': {} archive(s) updated",
        report.fixture,
        report.updated.len()
    );
    for install in &report.updated {
        println!("📁 {}", install.archive);
    }

    Ok(0)
}
