pub mod expr;
pub mod grid;
pub mod header;
pub mod normalize;
pub mod stream;

pub use grid::{check_mapping, parse_bom, parse_checklist, ParsedSheet, SkipReason};
pub use header::{find_header_row, predict_column, suggest_mapping, HeaderMatch, MappingSuggestion};
pub use normalize::{
    clean_box_label, clean_part_id, eval_quantity, extract_substitute_ids, format_quantity,
    is_empty_row, merge_box_labels,
};
pub use stream::BoxMarkers;
