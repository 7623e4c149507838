//! Dispatch of parsed commands to directory operations.

use crate::cli::Command;
use crate::envelope::{
    count_response, create_response, delete_response, get_response, list_response,
    search_response, update_response, Response,
};
use shopdir_core::{ShopDirectory, ShopDraft, ShopRepository};

/// Runs one command against the directory and shapes the outcome.
pub fn execute<R: ShopRepository>(directory: &ShopDirectory<R>, command: Command) -> Response {
    match command {
        Command::List => list_response(directory.list_all()),
        Command::Get { id } => get_response(id, directory.get_by_id(id)),
        Command::Create(args) => create_response(directory.create(&ShopDraft::from(args))),
        Command::Update { id, shop } => {
            update_response(id, directory.update(id, &ShopDraft::from(shop)))
        }
        Command::Delete { id } => delete_response(id, directory.delete(id)),
        Command::Search { term } => search_response(&term, directory.search(&term)),
        Command::Count => count_response(directory.count()),
    }
}
