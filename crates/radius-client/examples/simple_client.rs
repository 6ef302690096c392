use radius_client::{ClientConfig, RadiusClient};
use radius_proto::{
    AttributeHolder, AttributeKind, AttributeTemplate, Code, MemoryDictionary, Packet,
    RadiusAttribute, generate_request_authenticator,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const WISPR: u32 = 14122;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <username> [server_addr] [config.json]", args[0]);
        eprintln!("Example: {} alice 127.0.0.1:1813", args[0]);
        std::process::exit(1);
    }

    let username = &args[1];
    let server_addr: SocketAddr = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("127.0.0.1:1813")
        .parse()?;
    let config = match args.get(3) {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::new(Duration::from_secs(3), 2),
    };

    let log_level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dictionary = MemoryDictionary::standard()
        .with_vendor(WISPR, "WISPr")
        .with_template(AttributeTemplate::new(
            WISPR,
            1,
            "WISPr-Location-ID",
            AttributeKind::String,
        ));

    // Accounting-Request; the authenticator is not computed here, so a
    // strict server will discard it
    let mut packet = Packet::new(Code::AccountingRequest, 0, generate_request_authenticator());
    packet.add_attribute(RadiusAttribute::from_name(&dictionary, "User-Name", username)?)?;
    packet.add_attribute(RadiusAttribute::from_name(&dictionary, "Acct-Status-Type", "Start")?)?;
    packet.add_attribute(RadiusAttribute::from_name(&dictionary, "NAS-IP-Address", "127.0.0.1")?)?;
    packet.add_attribute(RadiusAttribute::from_name(
        &dictionary,
        "WISPr-Location-ID",
        "isocc=us,cc=1,ac=408,network=example",
    )?)?;

    println!("RADIUS Client Test");
    println!("==================");
    println!("Server: {}", server_addr);
    println!("{}", packet);
    println!();

    let client = RadiusClient::bind(&config, Arc::new(dictionary)).await?;

    match client.send(packet, server_addr).await {
        Ok(response) => {
            println!("Received response:");
            println!("{}", response);
            for (name, value) in response.attribute_map() {
                println!("  {} = {}", name, value);
            }
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
        }
    }

    println!();
    println!("Stats: {}", client.stats().to_json()?);
    client.shutdown();

    Ok(())
}
