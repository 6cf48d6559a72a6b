// Query a node through method-bound handles and a batch
use httprpc_client::{BatchRequest, Client};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8332/".to_string());
    let client = Client::new(url)?;

    let getblockcount = client.method("getblockcount")?;
    let height = getblockcount.invoke(vec![]).await?;
    println!("Height: {}", height);

    let responses = client
        .batch(vec![
            BatchRequest::new("getblockhash", vec![json!(0)]),
            BatchRequest::new("getblockhash", vec![height.clone()]),
        ])
        .await?;
    for response in &responses {
        match response.get("error") {
            Some(error) if !error.is_null() => println!("  error: {}", error),
            _ => println!("  {}", response["result"]),
        }
    }

    client.close().await;
    Ok(())
}
