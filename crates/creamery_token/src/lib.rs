//! # Milk Token Ledger
//!
//! Fungible reward token with bridge semantics: tokens exist on this side
//! only between a bridged deposit (mint) and a withdrawal (burn).
//!
//! ## Roles
//!
//! | Role           | Allows                                                  |
//! |----------------|---------------------------------------------------------|
//! | `DEPOSITOR`    | `deposit`, `deposit_encoded`                            |
//! | `CONTRACT`     | `game_mint`, `game_burn`, `game_withdraw`, `game_transfer_from` |
//! | `MASTER`       | `mint`                                                  |
//! | anyone         | `withdraw`, `transfer` on their own balance             |
//!
//! ## Example
//!
//! ```rust,ignore
//! let roles = Arc::new(RoleRegistry::new(deployer));
//! let milk = MilkToken::new(token_address, &TokenConfig::default(), roles.clone());
//!
//! roles.grant_role(deployer, Role::depositor(), bridge)?;
//! milk.deposit(bridge, player, amount)?;
//! milk.withdraw(player, amount)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod abi;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;

pub use abi::{decode_deposit_amount, encode_deposit_amount};
pub use config::TokenConfig;
pub use error::{TokenError, TokenResult};
pub use events::LedgerEvent;
pub use ledger::{MilkToken, MintReservation};
