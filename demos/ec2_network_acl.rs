//! Call the EC2 Query API with a signed request.
//!
//! ```text
//! cargo run --example ec2_network_acl -- [--presign] describe [acl-id]
//! cargo run --example ec2_network_acl -- [--presign] create-entry <acl-id> <rule-number> <cidr> <allow|deny>
//! ```
//!
//! Credentials come from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, and `AWS_SESSION_TOKEN`.
//! The endpoint comes from `AWS_REGION`, `SIGV4_SERVICE`, and `SIGV4_HOST`; if those are unset,
//! the `us-east-1` EC2 endpoint is used.

use {
    chrono::{DateTime, Utc},
    log::{error, info},
    scratchstack_aws_signer::{sigv4_sign_request, ClientConfig, Credentials, SignatureOptions},
    std::{
        env,
        process::exit,
        time::{Duration, SystemTime},
    },
};

const EC2_API_VERSION: &str = "2016-11-15";

fn usage() -> ! {
    eprintln!("Usage: ec2_network_acl [--presign] describe [acl-id]");
    eprintln!("       ec2_network_acl [--presign] create-entry <acl-id> <rule-number> <cidr> <allow|deny>");
    exit(2);
}

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let presign = match args.iter().position(|arg| arg == "--presign") {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    };

    let Some(credentials) = Credentials::from_env() else {
        error!("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set");
        exit(1);
    };

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        info!("Using the default EC2 endpoint: {}", e);
        ClientConfig::new("us-east-1", "ec2", "ec2.us-east-1.amazonaws.com")
    });

    let mut builder = config.request_builder();
    builder.timestamp(DateTime::<Utc>::from(SystemTime::now()));

    match args.first().map(String::as_str) {
        Some("describe") => {
            builder.query_param("Action", "DescribeNetworkAcls");
            if let Some(acl_id) = args.get(1) {
                builder.query_param("NetworkAclId.1", acl_id);
            }
        }
        Some("create-entry") => {
            let [_, acl_id, rule_number, cidr, action] = args.as_slice() else {
                usage();
            };
            builder
                .query_param("Action", "CreateNetworkAclEntry")
                .query_param("NetworkAclId", acl_id)
                .query_param("RuleNumber", rule_number)
                .query_param("Protocol", "-1")
                .query_param("RuleAction", action)
                .query_param("Egress", "false")
                .query_param("CidrBlock", cidr);
        }
        _ => usage(),
    }
    builder.query_param("Version", EC2_API_VERSION);

    let params = match builder.build() {
        Ok(params) => params,
        Err(e) => {
            error!("Invalid request: {}", e);
            exit(1);
        }
    };

    let options = if presign {
        SignatureOptions::query_string(Duration::from_secs(300))
    } else {
        SignatureOptions::default()
    };

    let output = match sigv4_sign_request(&credentials, &params, &options) {
        Ok(output) => output,
        Err(e) => {
            error!("Unable to sign request: {} ({})", e, e.error_code());
            exit(1);
        }
    };

    info!("{} {}", output.signed_request().method(), output.signed_request().url());
    let body = config.dispatcher().fetch(output.signed_request());
    println!("{}", String::from_utf8_lossy(&body));
}
