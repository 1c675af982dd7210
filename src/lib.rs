//! NeuralTwin Assistant - OS Dashboard conversational pipeline
//!
//! Turns a Korean free-text message into a structured answer: extracted
//! entities, a classified intent, an optional clarifying question, a
//! tab-specific KPI lookup and the ordered UI actions that move the
//! dashboard to where the answer lives.
//!
//! ## Pipeline
//! Message -> Extraction -> Classifier -> Disambiguation -> Handler -> Navigation plan
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use assistant_types::PageContext;
//! use chrono::NaiveDate;
//! use neuraltwin_assistant::classifier::{classify, ClassifierContext, EmptyCatalog};
//!
//! # async fn demo() {
//! let page = PageContext::with_tab("/insights", "overview");
//! let today = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
//! let ctx = ClassifierContext { page: &page, today };
//! let result = classify("오늘 방문객 몇 명이야?", &ctx, &EmptyCatalog).await;
//! println!("{} {:?}", result.intent, result.query_type());
//! # }
//! ```

// Core error handling and configuration
pub mod clock;
pub mod config;
pub mod error;

// Static dashboard knowledge
pub mod dictionary;

// Message understanding
pub mod classifier;
pub mod disambiguation;
pub mod extraction;

// Answers
pub mod data;
pub mod handlers;
pub mod navigation;

// Turn orchestration and its collaborators
pub mod auth;
pub mod database;
pub mod llm_client;
pub mod orchestrator;
pub mod rate_limit;

// HTTP surface (when enabled)
#[cfg(feature = "server")]
pub mod api;

// Client side: action dispatch and the marketing chatbot
pub mod chatbot;
pub mod dispatcher;

pub use classifier::classify;
pub use config::AssistantConfig;
pub use error::{AssistantError, ErrorKind, Result};
pub use navigation::{create_navigation_actions, NavigationPlan};
pub use orchestrator::{AssistantOrchestrator, Dependencies};

#[cfg(feature = "server")]
pub use api::create_assistant_router;
