//! Grouping of unordered OCR fragments into visual rows.
//!
//! Fragments from one printed line rarely share an identical `y`. A fragment
//! joins a row when its `y` is within half the row's tallest member of the
//! row's reference `y` (the `y` of the first fragment that opened it).

use crate::types::TextFragment;

/// Fragments judged to lie on one printed line, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    fragments: Vec<TextFragment>,
    reference_y: f32,
}

impl Row {
    fn open(fragment: TextFragment) -> Self {
        Self { reference_y: fragment.bounding_box.y, fragments: vec![fragment] }
    }

    /// `y` of the fragment that opened the row.
    pub fn reference_y(&self) -> f32 {
        self.reference_y
    }

    pub fn max_height(&self) -> f32 {
        self.fragments
            .iter()
            .map(|f| f.bounding_box.height)
            .fold(0.0, f32::max)
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Member texts joined left to right with single spaces.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn accepts(&self, fragment: &TextFragment) -> bool {
        let dy = (fragment.bounding_box.y - self.reference_y).abs();
        // A zero-height row has zero tolerance and only takes an exact match.
        dy == 0.0 || dy < self.max_height() / 2.0
    }

    fn push(&mut self, fragment: TextFragment) {
        self.fragments.push(fragment);
        self.fragments.sort_by(|a, b| a.bounding_box.x.total_cmp(&b.bounding_box.x));
    }
}

/// Cluster `fragments` into rows by vertical proximity.
///
/// Rows come back in creation order, which is top to bottom by reference `y`.
/// Ties in `y` keep input order.
pub fn group_into_rows(fragments: &[TextFragment]) -> Vec<Row> {
    let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| a.bounding_box.y.total_cmp(&b.bounding_box.y));

    let mut rows: Vec<Row> = Vec::new();
    for fragment in sorted {
        match rows.iter_mut().find(|row| row.accepts(fragment)) {
            Some(row) => row.push(fragment.clone()),
            None => rows.push(Row::open(fragment.clone())),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn frag(text: &str, x: f32, y: f32, height: f32) -> TextFragment {
        TextFragment::new(text, 0.9, BoundingBox::new(x, y, 60.0, height))
    }

    fn membership(rows: &[Row]) -> BTreeSet<BTreeSet<String>> {
        rows.iter()
            .map(|r| r.fragments().iter().map(|f| f.text.clone()).collect())
            .collect()
    }

    #[test]
    fn empty_input_gives_no_rows() {
        assert!(group_into_rows(&[]).is_empty());
    }

    #[test]
    fn identical_y_shares_one_row() {
        let rows = group_into_rows(&[
            frag("$4.50", 180.0, 120.0, 25.0),
            frag("Coffee", 50.0, 120.0, 25.0),
            frag("x2", 120.0, 120.0, 25.0),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "Coffee x2 $4.50");
    }

    #[test]
    fn small_jitter_stays_on_row() {
        let rows = group_into_rows(&[frag("Coffee", 50.0, 120.0, 25.0), frag("$4.50", 180.0, 127.0, 25.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reference_y(), 120.0);
    }

    #[test]
    fn gap_beyond_half_height_splits_rows() {
        // Taller fragment is 30 high; a 16px gap exceeds 15.
        let rows = group_into_rows(&[frag("Coffee", 50.0, 100.0, 30.0), frag("Sandwich", 50.0, 116.0, 20.0)]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn gap_at_exactly_half_height_splits_rows() {
        let rows = group_into_rows(&[frag("a", 0.0, 100.0, 20.0), frag("b", 0.0, 110.0, 20.0)]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn zero_height_requires_exact_y() {
        let rows = group_into_rows(&[
            frag("a", 0.0, 50.0, 0.0),
            frag("b", 10.0, 50.0, 0.0),
            frag("c", 20.0, 50.5, 0.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "a b");
    }

    #[test]
    fn rows_are_emitted_top_to_bottom() {
        let rows = group_into_rows(&[
            frag("Tax:", 50.0, 250.0, 25.0),
            frag("DEMO", 100.0, 50.0, 30.0),
            frag("Coffee", 50.0, 120.0, 25.0),
        ]);
        let ys: Vec<f32> = rows.iter().map(Row::reference_y).collect();
        assert_eq!(ys, vec![50.0, 120.0, 250.0]);
    }

    #[test]
    fn members_sorted_left_to_right() {
        let rows = group_into_rows(&[
            frag("$8.99", 180.0, 150.0, 25.0),
            frag("Sandwich", 50.0, 151.0, 25.0),
        ]);
        assert_eq!(rows[0].fragments()[0].text, "Sandwich");
    }

    #[test]
    fn grouping_ignores_input_order() {
        let fragments = vec![
            frag("DEMO COFFEE SHOP", 100.0, 50.0, 30.0),
            frag("Coffee", 50.0, 120.0, 25.0),
            frag("$4.50", 180.0, 122.0, 25.0),
            frag("Sandwich", 50.0, 150.0, 25.0),
            frag("$8.99", 180.0, 148.0, 25.0),
            frag("Subtotal:", 50.0, 220.0, 25.0),
            frag("$13.49", 180.0, 220.0, 25.0),
            frag("Tax:", 50.0, 250.0, 25.0),
            frag("$1.28", 180.0, 251.0, 25.0),
        ];
        let expected = membership(&group_into_rows(&fragments));
        assert_eq!(expected.len(), 5);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut shuffled = fragments.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(membership(&group_into_rows(&shuffled)), expected);
        }
    }

    #[test]
    fn nan_coordinates_still_group() {
        let rows = group_into_rows(&[
            frag("Coffee", 50.0, 120.0, 25.0),
            frag("garbled", 10.0, f32::NAN, 25.0),
            frag("$4.50", f32::NAN, 121.0, 25.0),
        ]);
        assert_eq!(rows.len(), 2);
        let total: usize = rows.iter().map(|r| r.fragments().len()).sum();
        assert_eq!(total, 3);
        assert_eq!(rows[0].reference_y(), 120.0);
    }
}
