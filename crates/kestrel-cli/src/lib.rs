use clap::ValueEnum;
use kestrel_core::analysis::Device;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
        }
    }
}

/// Device selection for the analyze and benchmark commands
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DeviceArg {
    Desktop,
    Mobile,
    Both,
}

impl DeviceArg {
    /// The single device profile this selects, if not `both`
    pub fn device(self) -> Option<Device> {
        match self {
            DeviceArg::Desktop => Some(Device::Desktop),
            DeviceArg::Mobile => Some(Device::Mobile),
            DeviceArg::Both => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}
