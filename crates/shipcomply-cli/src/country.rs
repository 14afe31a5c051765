//! `country` subcommand: print the code a free-text country normalizes to.

use anyhow::Result;
use clap::Args;
use shipcomply_core::normalize_country;

/// Arguments for the country subcommand.
#[derive(Args, Debug)]
pub struct CountryArgs {
    /// Country name, code or address text.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

pub fn run_country(args: &CountryArgs) -> Result<u8> {
    let text = args.text.join(" ");
    let code = normalize_country(&text);
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        println!("{code}");
        Ok(0)
    } else {
        println!("{code} (not a recognized country)");
        Ok(2)
    }
}
