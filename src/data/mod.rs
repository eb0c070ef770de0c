/// Data layer: core types, loading, role selection, checks and encoding.
///
/// Architecture:
/// ```text
///  .csv / .txt bytes + format tag
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse delimited text → Table
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection  │  result / predictors / numeric / hue
///   └───────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ validation  │  advisory dtype warnings
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ encoding  │  discrete columns → indicator columns
///   └──────────┘
/// ```

pub mod encoding;
pub mod loader;
pub mod model;
pub mod selection;
pub mod validation;
