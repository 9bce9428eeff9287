//! Dashboard counters for a vendor's product list.

use serde::Serialize;

use crate::product::{PostValidationAction, ProductStatus, VendorProduct};

/// Aggregated counts shown on the vendor dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub pending: usize,
    pub draft: usize,
    pub published: usize,
    /// Drafts whose design is approved: ready to publish safely.
    pub validated_drafts: usize,
    pub pending_auto_publish: usize,
    pub pending_to_draft: usize,
}

impl ProductStats {
    /// Drafts that would be published at the vendor's own risk.
    pub fn unvalidated_drafts(&self) -> usize {
        self.draft.saturating_sub(self.validated_drafts)
    }
}

/// Count products by status and pending products by post-validation action.
pub fn compute_stats(products: &[VendorProduct]) -> ProductStats {
    products.iter().fold(ProductStats::default(), |mut stats, p| {
        stats.total += 1;
        match p.status {
            ProductStatus::Pending => {
                stats.pending += 1;
                match p.post_validation_action {
                    PostValidationAction::AutoPublish => stats.pending_auto_publish += 1,
                    PostValidationAction::ToDraft => stats.pending_to_draft += 1,
                }
            }
            ProductStatus::Draft => {
                stats.draft += 1;
                if p.is_validated {
                    stats.validated_drafts += 1;
                }
            }
            ProductStatus::Published => stats.published += 1,
        }
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::product;

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(compute_stats(&[]), ProductStats::default());
    }

    #[test]
    fn counts_by_status_and_action() {
        let mut products = vec![
            product(1, None, PostValidationAction::AutoPublish),
            product(2, None, PostValidationAction::ToDraft),
            product(3, None, PostValidationAction::ToDraft),
            product(4, None, PostValidationAction::ToDraft),
            product(5, None, PostValidationAction::ToDraft),
            product(6, None, PostValidationAction::AutoPublish),
        ];
        products[3].status = ProductStatus::Draft;
        products[3].is_validated = true;
        products[4].status = ProductStatus::Draft;
        products[5].status = ProductStatus::Published;
        // Action on a published product is inert and must not be counted.
        products[5].post_validation_action = PostValidationAction::ToDraft;

        let stats = compute_stats(&products);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.draft, 2);
        assert_eq!(stats.published, 1);
        assert_eq!(stats.validated_drafts, 1);
        assert_eq!(stats.unvalidated_drafts(), 1);
        assert_eq!(stats.pending_auto_publish, 1);
        assert_eq!(stats.pending_to_draft, 2);
    }

    #[test]
    fn hand_built_stats_do_not_underflow() {
        let stats = ProductStats {
            draft: 1,
            validated_drafts: 3,
            ..ProductStats::default()
        };
        assert_eq!(stats.unvalidated_drafts(), 0);
    }
}
