use super::types::{QueryOutput, QueryRequest};
use crate::AppError;
use crate::core::assemble::assemble;
use crate::core::session::Session;
use crate::core::source::{SourcePrompt, SourceSelector};

/// Runs entity queries: source selection, then projection and sorting
pub struct QueryService<'a> {
    selector: SourceSelector<'a>,
}

impl<'a> QueryService<'a> {
    pub fn new(selector: SourceSelector<'a>) -> Self {
        Self { selector }
    }

    pub async fn run(
        &self,
        session: &mut Session,
        request: &QueryRequest,
        prompt: &mut dyn SourcePrompt,
    ) -> Result<QueryOutput, AppError> {
        let result = self
            .selector
            .get(session, &request.query, request.source, prompt)
            .await?;

        let rows = assemble(
            &result.records,
            &request.fields,
            &request.query.constants,
            &request.sort,
            &mut session.unknown_fields,
        );

        Ok(QueryOutput {
            rows,
            origin: result.origin,
        })
    }
}
