/*
 * Responsibility
 * - 外部依存 (authorization server / token store) をここに閉じ込める
 * - handler からは TokenRelay だけを使う
 */
pub mod oauth;
pub mod relay;
pub mod token_store;
