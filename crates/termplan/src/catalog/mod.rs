/// Section catalog: the read-only source of sections and corequisite
/// metadata, loaded from per-term JSON documents.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::schedule::{CorequisiteSource, CourseRef, Section};

/// One catalog document: a term's sections plus per-course corequisite
/// declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Numeric `YYYYTT` term code.
    pub term: String,
    pub sections: Vec<Section>,
    /// course_id -> required corequisite courses
    #[serde(default)]
    pub corequisites: HashMap<String, Vec<CourseRef>>,
}

/// In-memory index over every loaded catalog document.
pub struct CatalogIndex {
    terms: BTreeMap<String, Vec<Section>>,
    corequisites: HashMap<String, Vec<CourseRef>>,
}

impl CatalogIndex {
    /// Loads all catalog documents from a directory
    ///
    /// # Arguments
    /// * `catalog_dir` - Directory containing `*.json` catalog documents
    ///
    /// # Returns
    /// * `Ok(CatalogIndex)` - Index over every document found
    /// * `Err` - If the directory can't be read or a document can't be parsed
    pub fn load_from_directory(catalog_dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut documents = Vec::new();

        if catalog_dir.exists() && catalog_dir.is_dir() {
            for entry in fs::read_dir(catalog_dir)? {
                let entry = entry?;
                let path = entry.path();

                if path.extension().and_then(|s| s.to_str()) == Some("json") {
                    let content = fs::read_to_string(&path)?;
                    let document: CatalogDocument = serde_json::from_str(&content)?;
                    documents.push(document);
                }
            }
        }

        Ok(Self::from_documents(documents))
    }

    /// Builds an index from already-parsed documents
    pub fn from_documents(documents: Vec<CatalogDocument>) -> Self {
        let mut terms: BTreeMap<String, Vec<Section>> = BTreeMap::new();
        let mut corequisites = HashMap::new();

        for document in documents {
            terms
                .entry(document.term)
                .or_default()
                .extend(document.sections);
            corequisites.extend(document.corequisites);
        }

        CatalogIndex { terms, corequisites }
    }

    /// Creates an empty index
    pub fn empty() -> Self {
        CatalogIndex {
            terms: BTreeMap::new(),
            corequisites: HashMap::new(),
        }
    }

    /// Term codes with at least one section, sorted
    pub fn term_codes(&self) -> Vec<&str> {
        self.terms.keys().map(String::as_str).collect()
    }

    /// All sections offered in a term
    pub fn sections_for_term(&self, term_code: &str) -> &[Section] {
        self.terms.get(term_code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds a section by CRN within a term
    pub fn find_section(&self, term_code: &str, crn: &str) -> Option<&Section> {
        self.sections_for_term(term_code)
            .iter()
            .find(|section| section.crn == crn)
    }

    /// Case-insensitive search over course codes and titles within a term.
    /// An empty query matches everything.
    pub fn search(&self, term_code: &str, query: &str) -> Vec<&Section> {
        let needle = query.to_lowercase();
        self.sections_for_term(term_code)
            .iter()
            .filter(|section| {
                needle.is_empty()
                    || section.course.to_lowercase().contains(&needle)
                    || section.title.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl CorequisiteSource for CatalogIndex {
    fn corequisites_for(&self, course_id: &str) -> Vec<CourseRef> {
        self.corequisites.get(course_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> CatalogDocument {
        serde_json::from_value(serde_json::json!({
            "term": "202515",
            "sections": [
                {
                    "crn": "12345",
                    "course_id": "CS260",
                    "course": "CS 260",
                    "title": "Data Structures",
                    "credits": 4.0,
                    "instruction_method": "Face To Face",
                    "instruction_type": "Lecture",
                    "term": "202515",
                    "days": ["Monday", "Wednesday"],
                    "start_time": "10:00",
                    "end_time": "11:20"
                },
                {
                    "crn": "12346",
                    "course_id": "CHEM101",
                    "course": "CHEM 101",
                    "title": "General Chemistry I",
                    "credits": 3.0,
                    "instruction_method": "Face To Face",
                    "instruction_type": "Lecture",
                    "term": "202515",
                    "days": ["Tuesday"],
                    "start_time": "09:00",
                    "end_time": "10:20"
                }
            ],
            "corequisites": {
                "CHEM101": [{"id": "CHEM101L", "name": "CHEM 101 Lab"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_document_parsing_and_lookup() {
        let index = CatalogIndex::from_documents(vec![sample_document()]);
        assert_eq!(index.term_codes(), ["202515"]);
        assert_eq!(index.sections_for_term("202515").len(), 2);
        assert_eq!(index.sections_for_term("202615").len(), 0);

        let section = index.find_section("202515", "12345").unwrap();
        assert_eq!(section.course, "CS 260");
        assert!(index.find_section("202515", "99999").is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = CatalogIndex::from_documents(vec![sample_document()]);
        assert_eq!(index.search("202515", "chem").len(), 1);
        assert_eq!(index.search("202515", "data structures").len(), 1);
        assert_eq!(index.search("202515", "").len(), 2);
        assert_eq!(index.search("202515", "biology").len(), 0);
    }

    #[test]
    fn test_corequisite_lookup() {
        let index = CatalogIndex::from_documents(vec![sample_document()]);
        let coreqs = index.corequisites_for("CHEM101");
        assert_eq!(coreqs.len(), 1);
        assert_eq!(coreqs[0].id, "CHEM101L");
        assert!(index.corequisites_for("CS260").is_empty());
    }
}
