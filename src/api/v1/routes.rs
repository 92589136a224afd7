/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - Bearer が必要な範囲に access middleware を適用する
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::me::me;
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/me", get(me));

    access::apply(protected, state)
}
