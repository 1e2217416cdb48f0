pub mod manifest;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "pystub")]
#[command(about = "Build and install dummy python executables for runtime test fixtures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 印出編譯時嵌入的版本字串
    Print,

    /// 讀取 stub 執行檔並回報嵌入的版本
    Inspect {
        /// Path to a stub executable
        stub: String,

        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },

    /// 將 stub 安裝到 runtime 壓縮檔中
    Install {
        /// Path to a .runtime archive
        archive: String,

        /// Path to the stub executable to install
        stub: String,

        #[arg(long, default_value = manifest::DEFAULT_EXECUTABLE)]
        executable: String,

        #[arg(long, help = "Skip the stub/runtime version check")]
        force: bool,
    },

    /// 檢查 runtime 壓縮檔內的 stub 是否與檔名版本一致
    Verify {
        /// Path to a .runtime archive
        archive: String,

        #[arg(long, default_value = manifest::DEFAULT_EXECUTABLE)]
        executable: String,

        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },

    /// 依 TOML 清單批次安裝 stub
    Apply {
        /// Path to a fixture manifest
        manifest: String,

        #[arg(long, help = "Install this stub instead of the per-runtime ones")]
        stub: Option<String>,

        #[arg(long, help = "List the planned installs without touching archives")]
        dry_run: bool,
    },
}

impl Validate for Cli {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Print => Ok(()),
            Command::Inspect { stub, .. } => validation::validate_path("stub", stub),
            Command::Install {
                archive,
                stub,
                executable,
                ..
            } => {
                validation::validate_path("archive", archive)?;
                validation::validate_runtime_extension("archive", archive)?;
                validation::validate_path("stub", stub)?;
                validation::validate_member_name("executable", executable)
            }
            Command::Verify {
                archive, executable, ..
            } => {
                validation::validate_path("archive", archive)?;
                validation::validate_runtime_extension("archive", archive)?;
                validation::validate_member_name("executable", executable)
            }
            Command::Apply { manifest, stub, .. } => {
                validation::validate_path("manifest", manifest)?;
                if let Some(stub) = stub {
                    validation::validate_path("stub", stub)?;
                }
                Ok(())
            }
        }
    }
}
