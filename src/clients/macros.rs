/// Generates the id lookups every typed client shares:
/// `find_<entity>` (missing is `None`) and `require_<entity>` (missing is the
/// domain error's `NotFound`).
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await
                }

                #[tracing::instrument(skip(self))]
                pub(crate) async fn [<require_ $entity_name_snake>](&self, id: String) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(id.clone())
                        .await?
                        .ok_or_else(|| <$error>::NotFound(id))
                }
            }
        }
    };
}

/// Rejects non-admin callers with the client's `AccessDenied` variant.
#[macro_export]
macro_rules! require_admin {
    ($caller:expr, $error:ty) => {
        if !$caller.is_admin() {
            tracing::warn!(user_id = %$caller.user_id, "Admin operation refused");
            return Err(<$error>::AccessDenied("admin role required".to_string()));
        }
    };
}
