//! External "current-information" provider (C7's branch-A collaborator,
//! §4.7.3): a streaming chat completion service consulted for temporal
//! questions instead of the local vector store.

use crate::traits::language_model::TokenStream;

/// Mirrors `LanguageModel` in shape (a token stream) but is a distinct trait
/// because it is optional — its absence (no `PERPLEXITY_API_KEY`) disables
/// the temporal path entirely rather than substituting a default
/// implementation (§6.4, §8 scenario 6).
pub trait CurrentInfoProvider: Send + Sync + 'static {
    fn stream<'a>(&'a self, system_prompt: &'a str, question: &'a str) -> TokenStream<'a>;

    fn provider_name(&self) -> &str;
}
