//! Inline word and phrase hints for e-book text.
//!
//! A [`Lexicon`] is loaded once from flat files and shared read-only. The
//! scanner walks an HTML document, hands every run of body text to the
//! [`Annotator`], and leaves the markup itself untouched:
//!
//! ```
//! use wordwise_rs::{AnnotateOptions, Annotator, Dictionary, HintLevel, HintRecord, LemmaMap, Lexicon};
//!
//! let dictionary = Dictionary::from_records([HintRecord {
//!     word: "lantern".into(),
//!     phoneme: None,
//!     primary: "a light carried by a handle".into(),
//!     secondary: String::new(),
//!     hint_level: HintLevel::MAX,
//! }])?;
//! let lexicon = Lexicon::new(dictionary, LemmaMap::default());
//! let annotator = Annotator::new(&lexicon, AnnotateOptions::default());
//!
//! let doc = wordwise_rs::annotate_document("<body><p>A lantern.</p></body>", &annotator);
//! assert_eq!(
//!     doc.html,
//!     "<body><p>A <ruby>lantern<rt>a light carried by a handle</rt></ruby>.</p></body>"
//! );
//! # Ok::<(), wordwise_rs::ResourceError>(())
//! ```

pub mod annotator;
pub mod config;
pub mod convert;
pub mod error;
pub mod lexicon;
pub mod markup;
pub mod pipeline;
pub mod report;
pub mod resources;
pub mod scanner;
pub mod title;

pub use annotator::{Annotator, Lookup, SpanAnnotation};
pub use config::{AnnotateOptions, HintLevel, Language, ResourcePaths};
pub use convert::Converter;
pub use error::{ConvertError, ResourceError, WordwiseError};
pub use lexicon::{Dictionary, HintRecord, LemmaMap, Lexicon, MatchSource, Resolution};
pub use pipeline::{BookJob, annotate_html_file};
pub use report::{AnnotationReport, NoProgress, ScanProgress};
pub use resources::load_lexicon;
pub use scanner::{AnnotatedDocument, annotate_document, annotate_document_with_progress};
pub use title::patch_title;
