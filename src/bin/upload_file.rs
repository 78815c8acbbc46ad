//! Upload File CLI
//!
//! Uploads one local file through the hub and prints the terminal status.

use bytesize::ByteSize;
use clap::{Arg, Command};
use hub_file_upload::{ClientConfig, FileUpload, HubStatusCode, UploadRequest, UserContext};
use std::fs::File;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("upload_file")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Upload a file to blob storage through the hub")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("connection-string")
                .short('c')
                .long("connection-string")
                .env("IOTHUB_DEVICE_CONNECTION_STRING")
                .help("Device connection string (HostName=...;DeviceId=...;SharedAccessSignature=...)")
                .required(true),
        )
        .arg(
            Arg::new("blob-name")
                .short('b')
                .long("blob-name")
                .help("Name of the blob to create (defaults to the file name)"),
        )
        .arg(
            Arg::new("file")
                .help("File to upload")
                .required(true),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let connection_string = matches
        .get_one::<String>("connection-string")
        .ok_or("missing connection string")?;
    let file_path = Path::new(matches.get_one::<String>("file").ok_or("missing file")?);

    let blob_name = match matches.get_one::<String>("blob-name") {
        Some(name) => name.clone(),
        None => file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or("cannot derive a blob name from the file path")?
            .to_string(),
    };

    let file = File::open(file_path)?;
    let length = file.metadata()?.len();

    let config = ClientConfig::from_connection_string(connection_string)?;
    let file_upload = FileUpload::new(config)?;

    println!(
        "Uploading {} ({}) as {}",
        file_path.display(),
        ByteSize(length),
        blob_name
    );

    let request = UploadRequest::builder()
        .blob_name(blob_name)
        .payload(file)
        .length(length)
        .on_status(|status: HubStatusCode, _ctx: Option<&UserContext>| {
            log::debug!("Callback received status {}", status);
        })
        .build()?;

    let status = file_upload.submit_request(request)?.join()?;
    println!("Upload finished with status {}", status);

    if !status.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
