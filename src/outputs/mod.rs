//! Output generation modules for raw snapshots and article files.
//!
//! # Submodules
//!
//! - [`json`]: generic JSON persistence used for the raw data snapshots
//! - [`artifacts`]: one plain-text file per generated article
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── trending_topics.json   # topics as fetched
//! ├── basic_trends.json      # interest series per keyword
//! ├── related_queries.json   # related queries per keyword
//! ├── news_headlines.json    # headlines per keyword
//! ├── blog_1.txt             # generated articles, by ordinal
//! ├── blog_2.txt
//! └── ...
//! ```
//!
//! Raw snapshots land before aggregation so a failed run still leaves its
//! inputs on disk for inspection and replay.

pub mod artifacts;
pub mod json;
