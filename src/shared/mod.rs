pub mod constants;
pub mod data_uri;
pub mod llm;
pub mod pages;
pub mod prompts;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
