pub mod api;
pub mod config;
pub mod connection;
pub mod custom_types;
pub mod database;
pub mod error;
pub mod feed;
pub mod generator;
pub mod history;
pub mod mapper;
pub mod mcp_handler;
pub mod model;
pub mod preferences;
pub mod presentation;
pub mod repository;
pub mod types;
pub mod use_cases;

pub use database::Database;
pub use error::{Failure, FailureKind, LottoError, Outcome};
pub use feed::Feed;
pub use model::{GeneratedNumbers, LotteryType, LotteryTypes};
pub use use_cases::UseCases;
