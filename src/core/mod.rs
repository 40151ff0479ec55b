//! Core provider mechanisms.
//!
//! # Modules
//!
//! - [`poll`] - Waiting for asynchronous operations and retrying transient
//!   failures
//!
//! Resource handlers create or delete an object through the Atlas API and
//! then block on a [`poll::StateChangeConf`] until the object settles:
//!
//! ```rust,no_run
//! use mongodbatlas::core::poll::{PollSettings, Refresh, StateChangeConf};
//! use std::time::Duration;
//!
//! # async fn example() -> mongodbatlas::domain::Result<()> {
//! let settings = PollSettings::default();
//! let conf = settings.apply(
//!     StateChangeConf::new(["CREATING", "UPDATING"], ["IDLE"])
//!         .with_timeout(Duration::from_secs(3 * 3600))
//!         .with_poll_interval(Duration::from_secs(60))
//!         .with_delay(Duration::from_secs(180)),
//! );
//!
//! conf.wait_for_state(|| async { Ok(Refresh::<()>::status_only("IDLE")) })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod poll;
