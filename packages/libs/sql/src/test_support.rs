//! 테스트 공용 스키마

use dsq_core::schema::{SchemaModel, StaticSchemaProvider};

/// `dbo.Users(Id, Name, Password, Age)`, 기본키 `Id`
pub(crate) fn users_schema() -> SchemaModel {
    let provider = StaticSchemaProvider::new()
        .table("dbo", "Users")
        .columns("dbo", "Users", &["Id", "Name", "Password", "Age"])
        .primary_key("dbo", "Users", "Id", 1)
        .table("dbo", "Orders")
        .columns("dbo", "Orders", &["OrderId", "UserId", "Total"])
        .primary_key("dbo", "Orders", "OrderId", 1);
    SchemaModel::from_provider(&provider).unwrap()
}

/// 타입 정보가 있는 `dbo.Users`
pub(crate) fn typed_users_schema() -> SchemaModel {
    let provider = StaticSchemaProvider::new()
        .table("dbo", "Users")
        .typed_column("dbo", "Users", "Id", "int")
        .typed_column("dbo", "Users", "Name", "nvarchar(50)")
        .typed_column("dbo", "Users", "Age", "int")
        .primary_key("dbo", "Users", "Id", 1);
    SchemaModel::from_provider(&provider).unwrap()
}
