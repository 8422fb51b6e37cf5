//! Game platform API helpers.
//!
//! Every call goes through the shared [`RequestExecutor`](crate::client::RequestExecutor),
//! so definition lookups made while building one reply are served from the
//! cache after the first fetch, and live-state queries always hit the network.
//!
//! ```rust,no_run
//! use bungie_netreq::client::RequestExecutor;
//! use bungie_netreq::platform::{ComponentType, PlatformClient};
//! use std::sync::Arc;
//!
//! # async fn run() -> bungie_netreq::Result<()> {
//! let executor = Arc::new(RequestExecutor::builder().build()?);
//! let api = PlatformClient::new(executor, "my-api-key");
//!
//! let players = api.search_player("Tom", 2842).await?;
//! if let Some(player) = players.first() {
//!     let profile = api
//!         .profile(player.membership_type, &player.membership_id, &[ComponentType::Characters])
//!         .await?;
//!     println!("{}", profile["characters"]);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod envelope;

pub use client::{ComponentType, PlatformClient, UserInfoCard, DEFAULT_ROOT};
pub use envelope::{PlatformEnvelope, SUCCESS_CODE};
