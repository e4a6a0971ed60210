use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use bftnet_common::rpc::RpcClient;
use bftnet_harness::api::ClusterApi;
use bftnet_harness::clock::SystemClock;
use bftnet_harness::config::Config;
use bftnet_harness::provision::{ClusterTopology, Provisioner};
use bftnet_harness::runner::HarnessRunner;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let clock = SystemClock;

    let topology = ClusterTopology::fixed();
    let provisioner = Provisioner::new(
        topology,
        config.image.clone(),
        config.network.clone(),
        config.settle(),
    );

    if config.skip_provision {
        info!("reusing running cluster at {}", config.endpoint);
    } else {
        provisioner
            .provision(&clock)
            .await
            .context("provisioning the cluster topology")?;
    }

    let client = RpcClient::new(&config.endpoint).context("invalid endpoint")?;
    let api = ClusterApi::new(client);
    let runner = HarnessRunner::new(&api, &clock, config.backoff(), config.passphrase.clone());

    let result = runner.execute().await;

    // the cluster is stopped even when the scenario failed
    if !config.skip_provision && !config.keep_cluster {
        provisioner.teardown().await;
    }

    match result {
        Ok(ctx) => {
            info!(
                "run finished: origin={} alex={} bob={}, {} transfers confirmed",
                ctx.origin,
                ctx.alex,
                ctx.bob,
                ctx.confirmed.len()
            );
            Ok(())
        }
        Err(e) => {
            error!("run failed: {e}");
            Err(e.into())
        }
    }
}
