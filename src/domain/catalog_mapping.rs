//! Name → catalog ID lookup tables
//!
//! The import platform identifies departments, categories and brands by
//! numeric IDs. The tables are plain configuration data; a name that is not
//! listed resolves to an empty ID, which the import accepts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMapping {
    pub departments: HashMap<String, String>,
    pub categories: HashMap<String, String>,
    pub brands: HashMap<String, String>,
}

impl CategoryMapping {
    pub fn department_id(&self, name: &str) -> String {
        self.departments.get(name).cloned().unwrap_or_default()
    }

    pub fn category_id(&self, name: &str) -> String {
        self.categories.get(name).cloned().unwrap_or_default()
    }

    pub fn brand_id(&self, name: &str) -> String {
        self.brands.get(name).cloned().unwrap_or_default()
    }
}

fn table(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(name, id)| ((*name).to_string(), (*id).to_string()))
        .collect()
}

impl Default for CategoryMapping {
    fn default() -> Self {
        Self {
            departments: table(&[
                ("Auto Peças", "1"),
                ("Acessórios", "2"),
                ("Pneus", "3"),
                ("Óleos e Lubrificantes", "4"),
                ("Filtros", "5"),
                ("Freios", "6"),
                ("Suspensão", "7"),
                ("Motor", "8"),
                ("Elétrica", "9"),
                ("Carroceria", "10"),
            ]),
            categories: table(&[
                ("Pneus", "1"),
                ("Óleos", "2"),
                ("Filtros de Ar", "3"),
                ("Filtros de Óleo", "4"),
                ("Pastilhas de Freio", "5"),
                ("Amortecedores", "6"),
                ("Baterias", "7"),
                ("Lâmpadas", "8"),
                ("Espelhos", "9"),
                ("Tapetes", "10"),
            ]),
            brands: table(&[
                ("Pirelli", "1"),
                ("Michelin", "2"),
                ("Bridgestone", "3"),
                ("Shell", "4"),
                ("Mobil", "5"),
                ("Castrol", "6"),
                ("Bosch", "7"),
                ("NGK", "8"),
                ("Valeo", "9"),
                ("Continental", "10"),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_resolve() {
        let mapping = CategoryMapping::default();
        assert_eq!(mapping.department_id("Auto Peças"), "1");
        assert_eq!(mapping.category_id("Pneus"), "1");
        assert_eq!(mapping.brand_id("Bosch"), "7");
    }

    #[test]
    fn test_unknown_names_miss_silently() {
        let mapping = CategoryMapping::default();
        assert_eq!(mapping.department_id("Moda"), "");
        assert_eq!(mapping.category_id("Outros"), "");
        assert_eq!(mapping.brand_id("Colcci"), "");
    }
}
