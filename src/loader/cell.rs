//! Spreadsheet cell -> canonical text.

use calamine::Data;

/// Largest magnitude at which every integer is exactly representable in an f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Converts one cell to its canonical text form; `None` for an empty cell.
///
/// Text cells are returned verbatim (no trimming, leading zeros intact). Numeric
/// cells holding a whole number are written without a fractional part, so a
/// serial typed as the number 71 reads back as "71", not "71.0".
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(float_text(*f)),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Header cells -> column names. Blank headers become `Unnamed: <idx>` and
/// repeated names get a `.1`, `.2`, ... suffix so no column is dropped.
pub(crate) fn header_names(cells: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (idx, cell) in cells.iter().enumerate() {
        let base = match cell_text(cell) {
            Some(text) if !text.trim().is_empty() => text,
            _ => format!("Unnamed: {}", idx),
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_cells_are_verbatim() {
        assert_eq!(cell_text(&Data::String("0071".into())).as_deref(), Some("0071"));
        assert_eq!(cell_text(&Data::String(" S1 ".into())).as_deref(), Some(" S1 "));
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn test_whole_numbers_lose_the_fraction() {
        assert_eq!(cell_text(&Data::Float(71.0)).as_deref(), Some("71"));
        assert_eq!(cell_text(&Data::Float(-3.0)).as_deref(), Some("-3"));
        assert_eq!(cell_text(&Data::Int(12345)).as_deref(), Some("12345"));
        assert_eq!(cell_text(&Data::Float(71.25)).as_deref(), Some("71.25"));
        assert_eq!(cell_text(&Data::Bool(true)).as_deref(), Some("true"));
    }

    #[test]
    fn test_header_names_dedupe_and_fill_blanks() {
        let cells = vec![
            Data::String("Serial No".into()),
            Data::Empty,
            Data::String("Serial No".into()),
            Data::String("Serial No".into()),
        ];
        assert_eq!(
            header_names(&cells),
            vec!["Serial No", "Unnamed: 1", "Serial No.1", "Serial No.2"]
        );
    }
}
