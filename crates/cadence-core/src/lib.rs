//! Core library for cadence: deterministic posting-calendar math and the
//! LLM-backed content-plan orchestrator.
//!
//! The scheduling core (`calendar`) is pure and synchronous: holiday rules,
//! posting-slot generation, and anchor-to-slot alignment are functions of
//! their inputs and nothing else. Everything non-deterministic (the LLM, the
//! practice-research lookup, document text extraction) sits behind a narrow
//! trait boundary so the core can be tested with zero network dependency.

pub mod calendar;
pub mod document;
pub mod export;
pub mod generator;
pub mod plan;
pub mod research;
