//! Simple example running a few requests through the pipeline

use graphql_pipeline::prelude::*;
use serde_json::json;

fn build_schema() -> Result<Schema> {
    let book = ObjectType::new("Book")
        .field(FieldDefinition::new("title", TypeRef::named_non_null("String")))
        .field(FieldDefinition::new("author", TypeRef::named("String")));

    let query = ObjectType::new("Query").field(
        FieldDefinition::new("books", TypeRef::list(TypeRef::named("Book")))
            .argument(ArgumentDefinition::new("first", TypeRef::named("Int")).default_value(json!(2)))
            .complexity(|children, args| {
                let first = args.get("first").and_then(Value::as_u64).unwrap_or(2);
                first.saturating_mul(children)
            })
            .resolve_with(|info| {
                let first = info.arg("first").and_then(Value::as_u64).unwrap_or(2) as usize;
                let books = [
                    json!({ "title": "Dune", "author": "Frank Herbert" }),
                    json!({ "title": "Solaris", "author": "Stanisław Lem" }),
                    json!({ "title": "Kindred", "author": "Octavia E. Butler" }),
                ];
                Ok(Value::Array(books.into_iter().take(first).collect()))
            }),
    );

    Ok(Schema::builder("Query").object(query).object(book).build()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🚀 GraphQL Pipeline Simple Example\n");

    let schema = Arc::new(build_schema()?);
    let config = PipelineConfig::from_yaml_str("max_query_complexity: 100\n")?;
    let pipeline = RequestPipeline::from_config(config);

    println!("📋 Valid query");
    let result = pipeline
        .execute(ExecutionRequest::new(schema.clone(), "{ books { title author } }"))
        .await;
    println!("{}\n", serde_json::to_string_pretty(&result.to_json())?);

    println!("📋 Syntax error");
    let result = pipeline
        .execute(ExecutionRequest::new(schema.clone(), "{ books { title"))
        .await;
    println!("{}\n", serde_json::to_string_pretty(&result.to_json())?);

    println!("📋 Too costly query");
    let mut variables = Variables::new();
    variables.insert("first".to_string(), json!(10_000));
    let result = pipeline
        .execute(
            ExecutionRequest::new(schema.clone(), "query Books($first: Int) { books(first: $first) { title } }")
                .variables(variables),
        )
        .await;
    println!("{}\n", serde_json::to_string_pretty(&result.to_json())?);

    println!("📋 Built-in directives");
    for directive in list_internal_directives() {
        println!("   @{}", directive.name);
    }

    println!("\n✅ Done");
    Ok(())
}
