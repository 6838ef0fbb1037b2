//! Amino acid notation helpers.

lazy_static::lazy_static! {
    static ref FRAMESHIFT_TAIL: regex::Regex = regex::Regex::new(r"[A-Z]?fsX([0-9]+|\?)").unwrap();
}

/// Three-letter amino acid codes and their single-letter counterparts.
pub const THREE_TO_ONE: &[(&str, &str)] = &[
    ("Ala", "A"),
    ("Arg", "R"),
    ("Asn", "N"),
    ("Asp", "D"),
    ("Cys", "C"),
    ("Glu", "E"),
    ("Gln", "Q"),
    ("Gly", "G"),
    ("His", "H"),
    ("Ile", "I"),
    ("Leu", "L"),
    ("Lys", "K"),
    ("Met", "M"),
    ("Phe", "F"),
    ("Pro", "P"),
    ("Ser", "S"),
    ("Thr", "T"),
    ("Trp", "W"),
    ("Tyr", "Y"),
    ("Val", "V"),
    ("Ter", "X"),
];

/// Convert a protein change from three-letter to single-letter notation.
///
/// Frameshift tails such as `fsTer23` or `GlyfsTer?` are collapsed to `fs`.
/// Input already in single-letter notation is returned unchanged.
pub fn three_to_one(protein_change: &str) -> String {
    let mut result = protein_change.to_string();
    for (three, one) in THREE_TO_ONE {
        if result.contains(three) {
            result = result.replace(three, one);
        }
    }
    FRAMESHIFT_TAIL.replace_all(&result, "fs").into_owned()
}
