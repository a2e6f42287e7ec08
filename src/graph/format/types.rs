//! Column type formatting shared by every renderer.

use crate::schema::Column;

/// Raw type family, used to pick a rendering rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFamily {
    /// Length-bounded character/binary type; `unicode` stores 2 bytes per char
    Sized { unicode: bool },
    /// Exact numeric with precision and scale
    Exact,
    Other,
}

impl TypeFamily {
    fn of(type_name: &str) -> Self {
        match type_name.to_ascii_lowercase().as_str() {
            "char" | "varchar" | "binary" | "varbinary" => TypeFamily::Sized { unicode: false },
            "nchar" | "nvarchar" => TypeFamily::Sized { unicode: true },
            "decimal" | "numeric" => TypeFamily::Exact,
            _ => TypeFamily::Other,
        }
    }
}

/// Render a column's type the way every diagram format shows it.
///
/// | family | rendered |
/// |---|---|
/// | sized, `max_length == -1` | `type(max)` |
/// | sized | `type(len)`, halved for `nchar`/`nvarchar` |
/// | `decimal`/`numeric` | `type(precision,scale)` |
/// | other | raw name |
pub fn format_column_type(column: &Column) -> String {
    let name = column.data_type.trim();
    match TypeFamily::of(name) {
        TypeFamily::Sized { .. } if column.max_length == -1 => format!("{}(max)", name),
        TypeFamily::Sized { unicode: true } => format!("{}({})", name, column.max_length / 2),
        TypeFamily::Sized { unicode: false } => format!("{}({})", name, column.max_length),
        TypeFamily::Exact => format!("{}({},{})", name, column.precision, column.scale),
        TypeFamily::Other => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(data_type: &str, max_length: i64, precision: i64, scale: i64) -> Column {
        Column {
            name: "c".to_string(),
            data_type: data_type.to_string(),
            max_length,
            precision,
            scale,
            is_nullable: true,
            ordinal: 1,
        }
    }

    #[test]
    fn test_bounded_character_types() {
        assert_eq!(format_column_type(&col("varchar", 50, 0, 0)), "varchar(50)");
        assert_eq!(format_column_type(&col("char", 10, 0, 0)), "char(10)");
        assert_eq!(format_column_type(&col("varbinary", 16, 0, 0)), "varbinary(16)");
    }

    #[test]
    fn test_unicode_types_halve_byte_length() {
        assert_eq!(format_column_type(&col("nvarchar", 100, 0, 0)), "nvarchar(50)");
        assert_eq!(format_column_type(&col("NCHAR", 20, 0, 0)), "NCHAR(10)");
    }

    #[test]
    fn test_max_length_types() {
        assert_eq!(format_column_type(&col("nvarchar", -1, 0, 0)), "nvarchar(max)");
        assert_eq!(format_column_type(&col("varbinary", -1, 0, 0)), "varbinary(max)");
    }

    #[test]
    fn test_exact_numeric() {
        assert_eq!(format_column_type(&col("decimal", 9, 18, 2)), "decimal(18,2)");
        assert_eq!(format_column_type(&col("numeric", 5, 10, 0)), "numeric(10,0)");
    }

    #[test]
    fn test_other_types_unchanged() {
        assert_eq!(format_column_type(&col("int", 4, 10, 0)), "int");
        assert_eq!(format_column_type(&col("datetime2", 8, 27, 7)), "datetime2");
        assert_eq!(format_column_type(&col("uniqueidentifier", 16, 0, 0)), "uniqueidentifier");
    }
}
