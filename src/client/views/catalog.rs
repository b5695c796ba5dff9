use crate::client::api::{ApiClient, ClientError};
use crate::models::Company;

pub const ALL_CATEGORIES: &str = "all";

/// The public company list with its search box and category buttons.
#[derive(Debug, Clone)]
pub struct CompanyCatalog {
    companies: Vec<Company>,
    pub search: String,
    pub category: String,
}

impl CompanyCatalog {
    pub fn new(companies: Vec<Company>) -> Self {
        Self {
            companies,
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }

    pub async fn load(api: &ApiClient) -> Result<Self, ClientError> {
        Ok(Self::new(api.list_companies().await?))
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    /// `all` followed by each distinct category in listing order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for company in &self.companies {
            if !categories.contains(&company.category) {
                categories.push(company.category.clone());
            }
        }
        categories
    }

    /// Companies whose name or description contains the search term (case-insensitive)
    /// and whose category matches the selected one.
    pub fn filtered(&self) -> Vec<&Company> {
        let term = self.search.trim().to_lowercase();
        self.companies
            .iter()
            .filter(|c| {
                term.is_empty()
                    || c.name.to_lowercase().contains(&term)
                    || c.description.to_lowercase().contains(&term)
            })
            .filter(|c| self.category == ALL_CATEGORIES || c.category == self.category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Role;

    fn company(name: &str, description: &str, category: &str) -> Company {
        let now = Utc::now();
        Company {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@test.com", name.to_lowercase()),
            password_hash: String::new(),
            phone: "+36".to_string(),
            category: category.to_string(),
            description: description.to_string(),
            address: String::new(),
            image: String::new(),
            services: vec![],
            opening_hours: String::new(),
            rating: 5.0,
            role: Role::Company,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> CompanyCatalog {
        CompanyCatalog::new(vec![
            company("Bella", "Hairdressing and cosmetics", "Beauty & Hair"),
            company("FitPlus", "Modern gym with personal trainers", "Fitness & Sports"),
            company("Glow", "Cosmetics studio", "Beauty & Hair"),
        ])
    }

    #[test]
    fn lists_distinct_categories() {
        assert_eq!(
            catalog().categories(),
            vec!["all", "Beauty & Hair", "Fitness & Sports"]
        );
    }

    #[test]
    fn search_matches_name_or_description() {
        let mut catalog = catalog();
        catalog.search = "COSMETICS".to_string();
        let names: Vec<_> = catalog.filtered().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bella", "Glow"]);
    }

    #[test]
    fn category_and_search_combine() {
        let mut catalog = catalog();
        catalog.category = "Fitness & Sports".to_string();
        assert_eq!(catalog.filtered().len(), 1);
        catalog.search = "bella".to_string();
        assert!(catalog.filtered().is_empty());
    }
}
