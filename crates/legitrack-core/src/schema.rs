/// Arrow schema definitions for the CSV exports.
pub mod export {
    use arrow::datatypes::{DataType, Field, Schema};

    use crate::flatten::COLUMNS;

    /// Annotation columns appended to the tracked-bills export.
    pub const ANNOTATION_COLUMNS: &[&str] = &["comments", "links", "files", "position", "priority"];

    fn utf8_fields<'a>(names: impl IntoIterator<Item = &'a &'a str>) -> Vec<Field> {
        // Nullable: the CSV reader maps empty cells to null.
        names
            .into_iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect()
    }

    /// Schema for the full tracker export, one Utf8 column per `FlatRow` field.
    pub fn tracker_schema() -> Schema {
        Schema::new(utf8_fields(COLUMNS))
    }

    /// Schema for the tracked-bills export: tracker columns plus annotations.
    pub fn tracked_schema() -> Schema {
        Schema::new(utf8_fields(COLUMNS.iter().chain(ANNOTATION_COLUMNS)))
    }
}
