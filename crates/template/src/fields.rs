//! Card field identifiers and their display values

use std::fmt;

/// The fixed set of template fields a card fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    NameField,
    DobField,
    IssuedDate,
    ExpirationDate,
}

impl FieldId {
    /// Every field, in substitution order
    pub const ALL: [FieldId; 4] = [
        FieldId::NameField,
        FieldId::DobField,
        FieldId::IssuedDate,
        FieldId::ExpirationDate,
    ];

    /// The element id carrying this field in the template
    pub fn element_id(&self) -> &'static str {
        match self {
            FieldId::NameField => "NameField",
            FieldId::DobField => "DOBField",
            FieldId::IssuedDate => "IssuedDate",
            FieldId::ExpirationDate => "ExpirationDate",
        }
    }

    /// Look up a field by its element id (exact, case-sensitive)
    pub fn from_element_id(id: &str) -> Option<FieldId> {
        FieldId::ALL.into_iter().find(|f| f.element_id() == id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Display text for each card field
///
/// All four values are required by construction, so a map can never be
/// missing a field at substitution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    name: String,
    date_of_birth: String,
    issued_date: String,
    expiration_date: String,
}

impl FieldMap {
    /// Create a field map from already formatted display strings
    pub fn new(
        name: impl Into<String>,
        date_of_birth: impl Into<String>,
        issued_date: impl Into<String>,
        expiration_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            issued_date: issued_date.into(),
            expiration_date: expiration_date.into(),
        }
    }

    /// Display text for a field
    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::NameField => &self.name,
            FieldId::DobField => &self.date_of_birth,
            FieldId::IssuedDate => &self.issued_date,
            FieldId::ExpirationDate => &self.expiration_date,
        }
    }

    /// Iterate over `(field, value)` pairs in substitution order
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> + '_ {
        FieldId::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_element_ids() {
        let ids: Vec<_> = FieldId::ALL.iter().map(|f| f.element_id()).collect();
        assert_eq!(ids, vec!["NameField", "DOBField", "IssuedDate", "ExpirationDate"]);
    }

    #[test]
    fn test_from_element_id() {
        assert_eq!(FieldId::from_element_id("DOBField"), Some(FieldId::DobField));
        assert_eq!(FieldId::from_element_id("dobfield"), None);
        assert_eq!(FieldId::from_element_id("Logo"), None);
    }

    #[test]
    fn test_field_map_get() {
        let map = FieldMap::new("Jane Smith", "1985-06-20", "2026-02-01", "2026-02-08");
        assert_eq!(map.get(FieldId::NameField), "Jane Smith");
        assert_eq!(map.get(FieldId::ExpirationDate), "2026-02-08");

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[1], (FieldId::DobField, "1985-06-20"));
    }
}
