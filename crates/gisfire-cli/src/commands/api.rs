use anyhow::{anyhow, Result};
use gisfire_cli::config::ApiConfig;
use gisfire_cli::ApiArgs;
use gisfire_io::MeteocatClient;
use tracing::debug;

/// Build the data API client from flags, environment and config file.
pub fn client(args: &ApiArgs, config: &ApiConfig) -> Result<MeteocatClient> {
    let host = args
        .host
        .clone()
        .or_else(|| config.host.clone())
        .ok_or_else(|| {
            anyhow!("no data API host: pass --host, set GISFIRE_HOST or [api] host")
        })?;
    let username = args.username.clone().or_else(|| config.username.clone());
    let token = args.token.clone().or_else(|| config.token.clone());

    let mut client = MeteocatClient::new(host).with_srid(config.srid);
    match (username, token) {
        (Some(username), Some(token)) => {
            client = client.with_credentials(&username, &token);
        }
        (None, None) => debug!("no API credentials configured"),
        _ => return Err(anyhow!("API username and token must be given together")),
    }
    debug!(host = client.base_url(), srid = config.srid, "data API client ready");
    Ok(client)
}
