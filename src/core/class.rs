//! Class configuration business logic.
//!
//! Class rows keep their sections, fee structure, terms and subjects as JSON
//! text. This module is the single place that text is decoded; callers only
//! ever see [`ClassInfo`].

use crate::{
    entities::{SchoolClass, school_class},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A class configuration with its structured columns decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class id
    pub id: i32,
    /// Class name, matched against `student::Model::class_name`
    pub name: String,
    /// Section labels in display order
    pub sections: Vec<String>,
    /// Fee label to amount
    pub fee_structure: BTreeMap<String, f64>,
    /// Term labels in display order
    pub terms: Vec<String>,
    /// Subject names in display order
    pub subjects: Vec<String>,
}

impl ClassInfo {
    /// Encodes the structured columns back to JSON text for storage.
    pub fn to_active_model(&self) -> Result<school_class::ActiveModel> {
        Ok(school_class::ActiveModel {
            id: Set(self.id),
            name: Set(self.name.clone()),
            sections: Set(serde_json::to_string(&self.sections)?),
            fee_structure: Set(serde_json::to_string(&self.fee_structure)?),
            terms: Set(serde_json::to_string(&self.terms)?),
            subjects: Set(serde_json::to_string(&self.subjects)?),
        })
    }
}

impl TryFrom<school_class::Model> for ClassInfo {
    type Error = crate::errors::Error;

    fn try_from(model: school_class::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            sections: serde_json::from_str(&model.sections)?,
            fee_structure: serde_json::from_str(&model.fee_structure)?,
            terms: serde_json::from_str(&model.terms)?,
            subjects: serde_json::from_str(&model.subjects)?,
            name: model.name,
        })
    }
}

/// Retrieves every class ordered by id.
pub async fn get_all_classes(db: &DatabaseConnection) -> Result<Vec<ClassInfo>> {
    SchoolClass::find()
        .order_by_asc(school_class::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(ClassInfo::try_from)
        .collect()
}

/// Finds a class by id, returning None if it does not exist.
pub async fn get_class_by_id(db: &DatabaseConnection, class_id: i32) -> Result<Option<ClassInfo>> {
    SchoolClass::find_by_id(class_id)
        .one(db)
        .await?
        .map(ClassInfo::try_from)
        .transpose()
}

/// Finds a class by its exact name, returning None if it does not exist.
pub async fn get_class_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<ClassInfo>> {
    SchoolClass::find()
        .filter(school_class::Column::Name.eq(name))
        .one(db)
        .await?
        .map(ClassInfo::try_from)
        .transpose()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::setup_seeded_db;

    #[tokio::test]
    async fn test_classes_decode_structured_columns() -> Result<()> {
        let db = setup_seeded_db().await?;

        let classes = get_all_classes(&db).await?;
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].name, "Class 5");
        assert_eq!(classes[0].sections, vec!["A", "B"]);
        assert_eq!(classes[0].fee_structure["Monthly Fee"], 1200.0);
        assert_eq!(classes[0].terms, vec!["Term 1", "Term 2"]);
        assert_eq!(classes[0].subjects, vec!["English", "Math", "Science"]);
        assert_eq!(classes[1].subjects, vec!["English", "Math", "Social Science"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_missing_class_is_none() -> Result<()> {
        let db = setup_seeded_db().await?;
        assert!(get_class_by_id(&db, 99).await?.is_none());
        assert!(get_class_by_name(&db, "Class 12").await?.is_none());
        assert_eq!(get_class_by_id(&db, 2).await?.unwrap().name, "Class 6");
        Ok(())
    }

    #[test]
    fn test_malformed_blob_is_json_error() {
        let model = school_class::Model {
            id: 7,
            name: "Broken".to_string(),
            sections: "[\"A\"".to_string(),
            fee_structure: "{}".to_string(),
            terms: "[]".to_string(),
            subjects: "[]".to_string(),
        };
        assert!(matches!(ClassInfo::try_from(model), Err(Error::Json(_))));
    }
}
