//! Typereel - code-typing animation videos from source text.
//!
//! The crate turns a source file into a video of it being typed out:
//! syntax-highlighted lines appear character by character under a blinking
//! cursor while a spring-damper camera tracks the typing and slowly zooms
//! out to reveal the whole file.
//!
//! # Architecture
//!
//! - `schema`: session configuration and typing-speed profiles
//! - `highlight`: tokenizer and run segmentation
//! - `timeline`: frame-by-frame typing progress and content resolution
//! - `camera`: pan/zoom simulation
//! - `render`: image buffers, compositing and rasterization
//! - `pipeline`: the two render passes producing frame files
//! - `encode`: ffmpeg invocation over the frame directory
//!
//! # Example
//!
//! ```rust,no_run
//! use typereel::{Session, SessionConfig};
//!
//! let config: SessionConfig = serde_json::from_str(
//!     r#"{ "output_dir": "out", "output_name": "demo.mp4" }"#,
//! )?;
//! let session = Session::new("print('hello')\n", config)?;
//! let report = session.run()?;
//! println!("{} frames written", report.frames);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod camera;
pub mod encode;
pub mod highlight;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod timeline;

// Re-export commonly used types
pub use pipeline::{DirState, PipelineError, RunReport, Session};
pub use schema::{SessionConfig, SpeedProfile};
pub use timeline::{Timeline, TimelineGenerator};
