//! # Financial Health Advisor
//!
//! Turns unstructured small-business financial text into a schema-validated
//! health report, and runs an advisor conversation grounded in that report.
//!
//! ## Core Concepts
//!
//! - **Analysis Result**: The structured report (health score, metrics, risks,
//!   recommendations, monthly trend and a 6-period forecast)
//! - **Schema Contract**: The JSON Schema generated from [`AnalysisResult`]; it
//!   constrains the backend's output and drives the [`validator`]
//! - **Session**: The caller-owned, append-only history of one advisory dialogue
//! - **Generative backend**: The external model behind [`llm::GenerativeBackend`],
//!   treated as untrusted and fallible
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_health_advisor::*;
//! use financial_health_advisor::llm::*;
//! use std::sync::Arc;
//!
//! let config = AdvisorConfig::from_env();
//! let backend = Arc::new(GeminiClient::from_config(&config)?);
//!
//! let analyzer = FinancialAnalyzer::new(backend.clone(), config.clone());
//! let report = analyzer
//!     .analyze("Total Revenue: $1,200,000 ...", "Retail", Language::English)
//!     .await?;
//!
//! let assistant = AdvisorAssistant::new(backend, config);
//! let mut session = Session::new();
//! let reply = assistant
//!     .converse(&mut session, "What is my gross margin?", Some(&report))
//!     .await;
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod request;
pub mod schema;
pub mod session;
pub mod validator;

pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use request::{AnalysisRequest, Industry, Language};
pub use schema::*;
pub use session::{ConversationTurn, Session, TurnKind, TurnRole, FALLBACK_REPLY};
pub use validator::validate;
