//! Example of navigating a document without decoding it.
//!
//! cargo run --package shale --example nested_access

use shale::from_json;

fn main() -> Result<(), shale::Error> {
    let doc = from_json(r#"{"users": [{"name": "Amy"}, {"name": "Bob"}]}"#)?;

    // Each step dereferences pointers inside the raw bytes; nothing else of
    // the document is read.
    let root = doc.root().as_dict()?;
    let users = root.get("users")?.unwrap().as_array()?;
    let user = users.get(1)?.unwrap().as_dict()?;
    let name = user.get("name")?.unwrap().as_str()?;

    println!("{name}");
    Ok(())
}
