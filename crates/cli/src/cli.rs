use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use loyalty_rules::program::ValueType;

/// Loyalty onboarding configuration tool.
///
/// Works on a directory of YAML documents (attribute catalog, value program,
/// signal queues) and reports derived KPI counters and validation findings.
#[derive(Parser, Debug)]
#[command(name = "loyalty", about = "Loyalty onboarding rule configuration")]
pub struct CliArgs {
    /// Documents directory (overrides LOYALTY_DOCUMENTS_DIR)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config profile (overrides LOYALTY_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a starter set of documents for a new program
    Init {
        /// Id prefix for the generated documents, in kebab-case
        #[arg(long, default_value = "onboarding")]
        prefix: String,

        /// Display name used in document metadata
        #[arg(long, default_value = "Onboarding")]
        name: String,

        /// Value mechanic of the program
        #[arg(long, value_enum, default_value_t = ValueTypeArg::Points)]
        value_type: ValueTypeArg,
    },

    /// Validate every document in the directory
    Validate,

    /// List loaded documents
    List,

    /// Print one document as YAML
    Show {
        /// Document id (metadata.id)
        id: String,
    },

    /// Print KPI counters derived from the attribute catalog
    Kpis,

    /// Flip attributes on or off and save the catalog
    Toggle {
        /// Attribute names, e.g. SquareFootage
        #[arg(required = true)]
        attributes: Vec<String>,
    },

    /// Print the active configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueTypeArg {
    Points,
    Cashback,
    Credits,
    Vouchers,
    Hybrid,
}

impl From<ValueTypeArg> for ValueType {
    fn from(arg: ValueTypeArg) -> Self {
        match arg {
            ValueTypeArg::Points => ValueType::Points,
            ValueTypeArg::Cashback => ValueType::Cashback,
            ValueTypeArg::Credits => ValueType::Credits,
            ValueTypeArg::Vouchers => ValueType::Vouchers,
            ValueTypeArg::Hybrid => ValueType::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_flag_maps_to_model() {
        let args = CliArgs::try_parse_from(["loyalty", "init", "--value-type", "cashback"]).unwrap();
        let Command::Init { value_type, .. } = args.command else {
            panic!("expected init");
        };
        assert_eq!(ValueType::from(value_type), ValueType::Cashback);
    }

    #[test]
    fn unknown_value_type_is_rejected() {
        assert!(CliArgs::try_parse_from(["loyalty", "init", "--value-type", "miles"]).is_err());
    }
}
