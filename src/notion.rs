//! Notion API client: page creation and sequential block appends.
//!
//! Groups are uploaded strictly in order since the page must exist before
//! blocks can be appended to it. API errors are opaque here; the response
//! body is surfaced in the error and left for the caller to report.

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::block::{BlockKind, NativeBlock, PageGroup, RichTextRun};
use crate::config::Credentials;

const API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// A created page, identified by the id the API returned.
pub struct PageHandle {
    pub id: String,
}

impl PageHandle {
    /// Browser URL for the page.
    pub fn url(&self) -> String {
        format!("https://notion.so/{}", self.id.replace('-', ""))
    }
}

pub struct NotionClient {
    http: Client,
    credentials: Credentials,
}

impl NotionClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            credentials,
        }
    }

    /// Upload a document: the first group creates the page, the rest append
    /// to it one call at a time.
    pub async fn upload(&self, title: &str, groups: &[PageGroup]) -> Result<PageHandle> {
        let (first, rest) = match groups.split_first() {
            Some((first, rest)) => (first.as_slice(), rest),
            None => (&[][..], &[][..]),
        };
        info!(blocks = first.len(), "creating page \"{title}\"");
        let handle = self.create_page(title, first).await?;
        for (n, group) in rest.iter().enumerate() {
            info!(
                part = n + 2,
                of = groups.len(),
                blocks = group.len(),
                "appending blocks"
            );
            self.append_blocks(&handle, group).await?;
        }
        Ok(handle)
    }

    /// Create a page in the configured database with `group` as its children.
    pub async fn create_page(&self, title: &str, group: &[NativeBlock]) -> Result<PageHandle> {
        let body = json!({
            "parent": { "database_id": self.credentials.database_id },
            "properties": {
                "title": { "title": [{ "text": { "content": title } }] }
            },
            "children": group_children(group),
        });
        let response = self
            .http
            .post(format!("{API_BASE}/pages"))
            .bearer_auth(&self.credentials.api_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
            .context("creating Notion page")?;
        let page = read_response(response).await?;
        let id = page["id"]
            .as_str()
            .context("page response is missing an id")?
            .to_string();
        debug!(%id, "page created");
        Ok(PageHandle { id })
    }

    /// Append a group of blocks to an existing page.
    pub async fn append_blocks(&self, handle: &PageHandle, group: &[NativeBlock]) -> Result<()> {
        let body = json!({ "children": group_children(group) });
        let response = self
            .http
            .patch(format!("{API_BASE}/blocks/{}/children", handle.id))
            .bearer_auth(&self.credentials.api_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
            .context("appending blocks")?;
        read_response(response).await?;
        Ok(())
    }
}

async fn read_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await.context("reading API response")?;
    if !status.is_success() {
        bail!("Notion API returned {status}: {text}");
    }
    serde_json::from_str(&text).context("decoding API response")
}

/// Serialize a group into the `children` array of a create/append call,
/// re-nesting list items by their recorded depth.
pub fn group_children(group: &[NativeBlock]) -> Vec<Value> {
    let mut i = 0;
    emit_level(group, &mut i, 0)
}

fn emit_level(blocks: &[NativeBlock], i: &mut usize, depth: usize) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    while *i < blocks.len() {
        let d = blocks[*i].depth();
        if d < depth {
            break;
        }
        if d > depth {
            // Deeper item: nest under the item just emitted. An item orphaned
            // at the start of a group by a page cut attaches at this level.
            match out.last_mut() {
                Some(parent) if is_list_value(parent) => {
                    let children = emit_level(blocks, i, d);
                    let key = parent["type"].as_str().unwrap_or_default().to_string();
                    parent[key]["children"] = Value::Array(children);
                    continue;
                }
                _ => {}
            }
        }
        out.push(block_json(&blocks[*i]));
        *i += 1;
    }
    out
}

fn is_list_value(value: &Value) -> bool {
    matches!(
        value["type"].as_str(),
        Some("bulleted_list_item" | "numbered_list_item")
    )
}

/// One block in the Notion public block schema.
fn block_json(block: &NativeBlock) -> Value {
    let rich_text: Vec<Value> = block.rich_text.iter().map(run_json).collect();
    let key = type_key(&block.kind);
    let mut payload = json!({ "rich_text": rich_text });
    if let BlockKind::Code { language } = &block.kind {
        payload["language"] = json!(language.as_deref().unwrap_or("plain text"));
    }
    let mut object = serde_json::Map::new();
    object.insert("object".to_string(), json!("block"));
    object.insert("type".to_string(), json!(key));
    object.insert(key, payload);
    Value::Object(object)
}

fn type_key(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Heading { level } => format!("heading_{level}"),
        BlockKind::Paragraph => "paragraph".to_string(),
        BlockKind::BulletItem { .. } => "bulleted_list_item".to_string(),
        BlockKind::NumberedItem { .. } => "numbered_list_item".to_string(),
        BlockKind::Code { .. } => "code".to_string(),
    }
}

fn run_json(run: &RichTextRun) -> Value {
    let mut value = json!({
        "type": "text",
        "text": { "content": run.text }
    });
    if !run.is_plain() {
        value["annotations"] = json!({
            "bold": run.bold,
            "italic": run.italic,
            "code": run.code,
        });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(text: &str, depth: usize) -> NativeBlock {
        NativeBlock::new(
            BlockKind::BulletItem { depth },
            vec![RichTextRun::plain(text)],
        )
    }

    #[test]
    fn paragraph_block_shape() {
        let block = NativeBlock::new(BlockKind::Paragraph, vec![RichTextRun::plain("hi")]);
        let value = block_json(&block);
        assert_eq!(value["object"], "block");
        assert_eq!(value["type"], "paragraph");
        assert_eq!(value["paragraph"]["rich_text"][0]["text"]["content"], "hi");
        // plain runs carry no annotations object
        assert!(value["paragraph"]["rich_text"][0].get("annotations").is_none());
    }

    #[test]
    fn heading_type_key_includes_the_level() {
        let block = NativeBlock::new(
            BlockKind::Heading { level: 3 },
            vec![RichTextRun::plain("t")],
        );
        let value = block_json(&block);
        assert_eq!(value["type"], "heading_3");
        assert!(value["heading_3"]["rich_text"].is_array());
    }

    #[test]
    fn styled_runs_carry_annotations() {
        let run = RichTextRun {
            text: "b".into(),
            bold: true,
            italic: false,
            code: false,
        };
        let value = run_json(&run);
        assert_eq!(value["annotations"]["bold"], true);
        assert_eq!(value["annotations"]["italic"], false);
    }

    #[test]
    fn code_block_carries_a_language() {
        let block = NativeBlock::new(
            BlockKind::Code {
                language: Some("rust".into()),
            },
            vec![RichTextRun::plain("fn main() {}")],
        );
        let value = block_json(&block);
        assert_eq!(value["code"]["language"], "rust");

        let untagged = NativeBlock::new(
            BlockKind::Code { language: None },
            vec![RichTextRun::plain("text")],
        );
        assert_eq!(block_json(&untagged)["code"]["language"], "plain text");
    }

    #[test]
    fn nested_list_items_become_children() {
        let group = vec![bullet("top", 0), bullet("nested", 1), bullet("sibling", 0)];
        let children = group_children(&group);
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0]["bulleted_list_item"]["children"][0]["bulleted_list_item"]["rich_text"][0]
                ["text"]["content"],
            "nested"
        );
        assert_eq!(
            children[1]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
            "sibling"
        );
    }

    #[test]
    fn orphaned_deep_item_attaches_at_top_level() {
        // A page cut can leave a depth-1 item first in its group.
        let group = vec![bullet("orphan", 1), bullet("next", 0)];
        let children = group_children(&group);
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
            "orphan"
        );
    }

    #[test]
    fn depth_jump_nests_under_the_last_item() {
        let group = vec![bullet("top", 0), bullet("deep", 2)];
        let children = group_children(&group);
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0]["bulleted_list_item"]["children"][0]["bulleted_list_item"]["rich_text"][0]
                ["text"]["content"],
            "deep"
        );
    }
}
