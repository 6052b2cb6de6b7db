use std::env;
use std::process::ExitCode;

use gmail_openid_bridge::{AssertionValidator, OpenIDParameters};
use url::Url;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    // read the redirect URL of the OpenID response from the command line
    let url = match env::args().nth(1) {
        Some(url) => url,
        None => {
            eprintln!("Usage: check_response <return-to URL with openid.* query arguments>");
            return ExitCode::FAILURE;
        },
    };

    let url = match Url::parse(&url) {
        Ok(url) => url,
        Err(error) => {
            eprintln!("Failed to parse redirect URL: {}", error);
            return ExitCode::FAILURE;
        },
    };

    let params = OpenIDParameters::from_query(&url);

    match AssertionValidator::new().verify(&params) {
        Ok(assertion) => {
            println!("Verified {} ({}).", assertion.email(), assertion.claimed_id());
            ExitCode::SUCCESS
        },
        Err(reason) => {
            println!("Not a trustworthy Google email assertion: {}", reason);
            ExitCode::FAILURE
        },
    }
}
