//! Environment provisioner: an isolated five-node topology driven through
//! the container runtime.
//!
//! Build and create steps are idempotent (an existing image or network is
//! reused); teardown stops every node of the topology unconditionally.
//! Shell-level failures surface as [`ProvisionError`], they are never
//! swallowed.

use std::process::{ExitStatus, Output};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;

use crate::clock::Clock;
use crate::config::{NETWORK_SUBNET, REPLICA_COUNT, REPLICA_PORT, RPC_PORT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Replica,
    ClientFacing,
}

/// One node of the fixed topology. Assigned at provisioning time and
/// immutable for the lifetime of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub role: NodeRole,
    // container name, doubling as the hostname inside the cluster network
    pub name: String,
    pub address: String,
    pub port: u16,
}

/// The fixed 4+1 layout: four replicas plus the client-facing node.
#[derive(Debug, Clone)]
pub struct ClusterTopology {
    replicas: Vec<NodeDescriptor>,
    client: NodeDescriptor,
}

impl ClusterTopology {
    /// Deterministic addresses inside [`NETWORK_SUBNET`]: replicas at
    /// .10 through .13, the client-facing node at .20.
    pub fn fixed() -> Self {
        let replicas = (0..REPLICA_COUNT)
            .map(|i| NodeDescriptor {
                role: NodeRole::Replica,
                name: format!("bftnet-replica-{}", i),
                address: format!("172.28.0.{}", 10 + i),
                port: REPLICA_PORT,
            })
            .collect();

        let client = NodeDescriptor {
            role: NodeRole::ClientFacing,
            name: String::from("bftnet-client"),
            address: String::from("172.28.0.20"),
            port: RPC_PORT,
        };

        Self { replicas, client }
    }

    pub fn replicas(&self) -> &[NodeDescriptor] {
        &self.replicas
    }

    pub fn client_facing(&self) -> &NodeDescriptor {
        &self.client
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.replicas.iter().chain(std::iter::once(&self.client))
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Drives the container runtime to stand the topology up and down.
pub struct Provisioner {
    topology: ClusterTopology,
    image: String,
    network: String,
    settle: Duration,
}

impl Provisioner {
    pub fn new(topology: ClusterTopology, image: String, network: String, settle: Duration) -> Self {
        Self {
            topology,
            image,
            network,
            settle,
        }
    }

    pub fn topology(&self) -> &ClusterTopology {
        &self.topology
    }

    async fn run(&self, args: &[String]) -> Result<Output, ProvisionError> {
        let command = format!("docker {}", args.join(" "));
        debug!("running {}", command);

        let output = Command::new("docker")
            .args(args)
            .output()
            .await
            .map_err(|source| ProvisionError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProvisionError::CommandFailed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(output)
    }

    // A failed inspect only tells us the object is absent; a runtime that
    // cannot even be spawned still propagates.
    async fn exists(&self, args: &[String]) -> Result<bool, ProvisionError> {
        match self.run(args).await {
            Ok(_) => Ok(true),
            Err(ProvisionError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn build_image(&self) -> Result<(), ProvisionError> {
        let inspect = vec!["image".into(), "inspect".into(), self.image.clone()];
        if self.exists(&inspect).await? {
            info!("image {} already present, skipping build", self.image);
            return Ok(());
        }

        info!("building node image {}", self.image);
        self.run(&["build".into(), "-t".into(), self.image.clone(), ".".into()])
            .await?;
        Ok(())
    }

    pub async fn create_network(&self) -> Result<(), ProvisionError> {
        let inspect = vec!["network".into(), "inspect".into(), self.network.clone()];
        if self.exists(&inspect).await? {
            info!("network {} already present, skipping create", self.network);
            return Ok(());
        }

        info!("creating isolated network {}", self.network);
        self.run(&[
            "network".into(),
            "create".into(),
            "--subnet".into(),
            NETWORK_SUBNET.into(),
            self.network.clone(),
        ])
        .await?;
        Ok(())
    }

    fn launch_args(&self, node: &NodeDescriptor) -> Vec<String> {
        let mut args = vec![
            "run".into(),
            "-d".into(),
            "--name".into(),
            node.name.clone(),
            "--hostname".into(),
            node.name.clone(),
            "--network".into(),
            self.network.clone(),
            "--ip".into(),
            node.address.clone(),
        ];
        // only the client-facing node is reachable from the host
        if node.role == NodeRole::ClientFacing {
            args.push("-p".into());
            args.push(format!("{}:{}", node.port, node.port));
        }
        args.push(self.image.clone());
        args.push("--role".into());
        args.push(
            match node.role {
                NodeRole::Replica => "replica",
                NodeRole::ClientFacing => "client",
            }
            .into(),
        );
        args
    }

    pub async fn launch(&self) -> Result<(), ProvisionError> {
        for node in self.topology.iter() {
            info!("launching {} at {}:{}", node.name, node.address, node.port);
            self.run(&self.launch_args(node)).await?;
        }
        Ok(())
    }

    /// Build, create, launch, then give the cluster its settling interval.
    pub async fn provision(&self, clock: &dyn Clock) -> Result<(), ProvisionError> {
        self.build_image().await?;
        self.create_network().await?;
        self.launch().await?;

        info!("topology launched, settling for {:?}", self.settle);
        clock.sleep(self.settle).await;
        Ok(())
    }

    /// Stop every node of the topology. Failures to stop individual nodes
    /// are logged and do not prevent the remaining stops.
    pub async fn teardown(&self) {
        for node in self.topology.iter() {
            debug!("stopping {}", node.name);
            if let Err(e) = self.run(&["stop".into(), node.name.clone()]).await {
                warn!("could not stop {}: {}", node.name, e);
            }
        }
    }
}
