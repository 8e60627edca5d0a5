//! Command line options shared by every subcommand.

use alpr_sdk::core::config::{FeatureToggles, LicenseToken};
use alpr_sdk::core::errors::AlprResult;
use clap::{ArgAction, Args};
use std::path::PathBuf;

/// Engine options common to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Folder containing the configuration files and models
    #[arg(long, env = "ALPR_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Recognition charset (latin, korean, chinese, ...)
    #[arg(long, default_value = "latin", env = "ALPR_CHARSET")]
    pub charset: String,

    /// File containing the base64 license token
    #[arg(long, env = "ALPR_TOKEN_FILE", conflicts_with = "tokendata")]
    pub tokenfile: Option<PathBuf>,

    /// Base64 license token
    #[arg(long, env = "ALPR_TOKEN_DATA")]
    pub tokendata: Option<String>,

    /// Enable the rectification layer (true/false)
    #[arg(long, action = ArgAction::Set, default_value_t = false)]
    pub rectify: bool,

    /// Enable night vision image enhancement (true/false)
    #[arg(long, action = ArgAction::Set, default_value_t = false)]
    pub ienv: bool,

    /// Enable license plate country identification (true/false)
    #[arg(long = "klass-lpci", action = ArgAction::Set, default_value_t = false)]
    pub klass_lpci: bool,

    /// Enable vehicle color recognition (true/false)
    #[arg(long = "klass-vcr", action = ArgAction::Set, default_value_t = false)]
    pub klass_vcr: bool,

    /// Enable vehicle make/model/year recognition (true/false)
    #[arg(long = "klass-vmmr", action = ArgAction::Set, default_value_t = false)]
    pub klass_vmmr: bool,

    /// Enable vehicle body style recognition (true/false)
    #[arg(long = "klass-vbsr", action = ArgAction::Set, default_value_t = false)]
    pub klass_vbsr: bool,

    /// Report cars detected without a readable plate (true/false)
    #[arg(long = "car-noplate", action = ArgAction::Set, default_value_t = false)]
    pub car_noplate: bool,
}

impl EngineArgs {
    /// Resolves the license token from `--tokenfile` / `--tokendata`.
    pub fn license(&self) -> AlprResult<LicenseToken> {
        LicenseToken::from_sources(self.tokenfile.clone(), self.tokendata.clone())
    }

    pub fn features(&self) -> FeatureToggles {
        FeatureToggles {
            night_vision: self.ienv,
            country_identification: self.klass_lpci,
            vehicle_color: self.klass_vcr,
            vehicle_make_model: self.klass_vmmr,
            vehicle_body_style: self.klass_vbsr,
            car_without_plate: self.car_noplate,
        }
    }
}

/// How results are printed.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raw engine JSON
    Json,
    /// Human readable summary
    #[default]
    Pretty,
}
