use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::db::models::DonationCampaign;
use crate::error::{AppError, AppResult};
use crate::read_model::pagination::{Page, PageRequest};

/// A campaign with its funding state computed from the donations table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: DonationCampaign,
    pub total_donated: f64,
    pub donor_count: i64,
    pub remaining: f64,
}

impl CampaignSummary {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let campaign = DonationCampaign::from_row(row)?;
        let base = DonationCampaign::COLUMN_COUNT;
        let total_donated: f64 = row.get(base)?;
        let remaining = (campaign.max_donation - total_donated).max(0.0);
        Ok(Self {
            campaign,
            total_donated,
            donor_count: row.get(base + 1)?,
            remaining,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: String,
    pub amount: f64,
    pub donated_at: String,
}

/// Every gift one donor made to a single campaign.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorTotal {
    pub donor_email: String,
    pub donor_name: String,
    pub total: f64,
    pub donations: Vec<Gift>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub summary: CampaignSummary,
    pub donors: Vec<DonorTotal>,
}

/// A donor's history with one campaign. Campaign fields are null when the
/// campaign no longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignContribution {
    pub campaign_id: String,
    pub pet_name: Option<String>,
    pub pet_image: Option<String>,
    pub total: f64,
    pub donations: Vec<Gift>,
}

fn summaries(
    conn: &Connection,
    filter: &str,
    tail: &str,
    args: &[&dyn rusqlite::ToSql],
) -> AppResult<Vec<CampaignSummary>> {
    let sql = format!(
        "SELECT {}, COALESCE(SUM(d.amount), 0.0), COUNT(DISTINCT d.donor_email)
         FROM donation_campaigns c
         LEFT JOIN donations d ON d.campaign_id = c.id
         WHERE {filter}
         GROUP BY c.rowid
         ORDER BY c.rowid DESC
         {tail}",
        DonationCampaign::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(args, CampaignSummary::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_campaign(conn: &Connection, campaign_id: &str) -> AppResult<Option<DonationCampaign>> {
    let sql = format!(
        "SELECT {} FROM donation_campaigns c WHERE c.id = ?1",
        DonationCampaign::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![campaign_id], DonationCampaign::from_row)
        .optional()?)
}

/// Sum of every donation to the campaign; zero when there are none.
pub fn get_campaign_total(conn: &Connection, campaign_id: &str) -> AppResult<f64> {
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM donations WHERE campaign_id = ?1",
        params![campaign_id],
        |row| row.get(0),
    )?)
}

/// Newest campaigns first.
pub fn list_campaigns(conn: &Connection, page: PageRequest) -> AppResult<Page<CampaignSummary>> {
    let matching: i64 =
        conn.query_row("SELECT COUNT(*) FROM donation_campaigns", [], |row| row.get(0))?;
    let items = summaries(
        conn,
        "1 = 1",
        "LIMIT ?1 OFFSET ?2",
        params![i64::from(page.limit), page.offset()],
    )?;

    Ok(Page {
        items,
        total_pages: page.total_pages(u64::try_from(matching).unwrap_or(0)),
        current_page: page.page,
    })
}

pub fn list_all_campaigns(conn: &Connection) -> AppResult<Vec<CampaignSummary>> {
    summaries(conn, "1 = 1", "", params![])
}

pub fn list_my_campaigns(conn: &Connection, creator_email: &str) -> AppResult<Vec<CampaignSummary>> {
    summaries(conn, "c.creator_email = ?1", "", params![creator_email])
}

/// Campaign summary plus donations grouped by donor, ordered by donor email.
pub fn get_campaign_detail(conn: &Connection, campaign_id: &str) -> AppResult<CampaignDetail> {
    let summary = summaries(conn, "c.id = ?1", "", params![campaign_id])?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound)?;

    let mut stmt = conn.prepare(
        "SELECT donor_email, donor_name, id, amount, donated_at
         FROM donations
         WHERE campaign_id = ?1
         ORDER BY donor_email, rowid",
    )?;
    let rows = stmt
        .query_map(params![campaign_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                Gift {
                    id: row.get(2)?,
                    amount: row.get(3)?,
                    donated_at: row.get(4)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut donors: Vec<DonorTotal> = Vec::new();
    for (email, name, gift) in rows {
        match donors.last_mut() {
            Some(current) if current.donor_email == email => {
                current.total += gift.amount;
                current.donations.push(gift);
            }
            _ => donors.push(DonorTotal {
                donor_email: email,
                donor_name: name,
                total: gift.amount,
                donations: vec![gift],
            }),
        }
    }

    Ok(CampaignDetail { summary, donors })
}

/// A donor's gifts grouped by campaign, in order of first gift.
pub fn list_my_donations(
    conn: &Connection,
    donor_email: &str,
) -> AppResult<Vec<CampaignContribution>> {
    let mut stmt = conn.prepare(
        "SELECT d.campaign_id, c.pet_name, c.pet_image, d.id, d.amount, d.donated_at
         FROM donations d
         LEFT JOIN donation_campaigns c ON c.id = d.campaign_id
         WHERE d.donor_email = ?1
         ORDER BY d.rowid",
    )?;
    let rows = stmt
        .query_map(params![donor_email], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                Gift {
                    id: row.get(3)?,
                    amount: row.get(4)?,
                    donated_at: row.get(5)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut grouped: Vec<CampaignContribution> = Vec::new();
    for (campaign_id, pet_name, pet_image, gift) in rows {
        match grouped.iter_mut().find(|g| g.campaign_id == campaign_id) {
            Some(group) => {
                group.total += gift.amount;
                group.donations.push(gift);
            }
            None => grouped.push(CampaignContribution {
                campaign_id,
                pet_name,
                pet_image,
                total: gift.amount,
                donations: vec![gift],
            }),
        }
    }

    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::ledger::{create_campaign, donor, record_donation, sample_campaign};

    #[test]
    fn campaign_total_sums_donations() {
        let conn = test_connection();
        let campaign = create_campaign(&conn, sample_campaign("Rex", "c@example.com")).unwrap();
        for amount in [10.0, 25.0, 5.0] {
            record_donation(&conn, &campaign.id, donor("d@example.com"), amount).unwrap();
        }

        assert_eq!(get_campaign_total(&conn, &campaign.id).unwrap(), 40.0);
    }

    #[test]
    fn campaign_total_is_zero_without_donations() {
        let conn = test_connection();
        let campaign = create_campaign(&conn, sample_campaign("Rex", "c@example.com")).unwrap();

        assert_eq!(get_campaign_total(&conn, &campaign.id).unwrap(), 0.0);
        assert_eq!(get_campaign_total(&conn, "unknown").unwrap(), 0.0);
    }

    #[test]
    fn summaries_compute_totals_donors_and_remaining() {
        let conn = test_connection();
        let rex = create_campaign(&conn, sample_campaign("Rex", "c@example.com")).unwrap();
        let tom = create_campaign(&conn, sample_campaign("Tom", "c@example.com")).unwrap();

        record_donation(&conn, &rex.id, donor("a@example.com"), 30.0).unwrap();
        record_donation(&conn, &rex.id, donor("a@example.com"), 20.0).unwrap();
        record_donation(&conn, &rex.id, donor("b@example.com"), 80.0).unwrap();

        let all = list_all_campaigns(&conn).unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].campaign.id, tom.id);
        assert_eq!(all[0].total_donated, 0.0);
        assert_eq!(all[0].donor_count, 0);
        assert_eq!(all[0].remaining, 100.0);

        assert_eq!(all[1].campaign.id, rex.id);
        assert_eq!(all[1].total_donated, 130.0);
        assert_eq!(all[1].donor_count, 2);
        assert_eq!(all[1].remaining, 0.0);
    }

    #[test]
    fn list_campaigns_paginates() {
        let conn = test_connection();
        for i in 0..3 {
            create_campaign(&conn, sample_campaign(&format!("pet-{i}"), "c@example.com")).unwrap();
        }

        let first = list_campaigns(&conn, PageRequest::new(1, 2)).unwrap();
        assert_eq!(first.total_pages, 2);
        let names: Vec<_> = first.items.iter().map(|s| s.campaign.pet_name.as_str()).collect();
        assert_eq!(names, vec!["pet-2", "pet-1"]);

        let second = list_campaigns(&conn, PageRequest::new(2, 2)).unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.current_page, 2);
    }

    #[test]
    fn campaign_detail_groups_by_donor() {
        let conn = test_connection();
        let campaign = create_campaign(&conn, sample_campaign("Rex", "c@example.com")).unwrap();
        record_donation(&conn, &campaign.id, donor("b@example.com"), 5.0).unwrap();
        record_donation(&conn, &campaign.id, donor("a@example.com"), 10.0).unwrap();
        record_donation(&conn, &campaign.id, donor("b@example.com"), 7.5).unwrap();

        let detail = get_campaign_detail(&conn, &campaign.id).unwrap();
        assert_eq!(detail.summary.total_donated, 22.5);
        assert_eq!(detail.donors.len(), 2);

        assert_eq!(detail.donors[0].donor_email, "a@example.com");
        assert_eq!(detail.donors[0].total, 10.0);

        let b = &detail.donors[1];
        assert_eq!(b.donor_email, "b@example.com");
        assert_eq!(b.total, 12.5);
        let amounts: Vec<f64> = b.donations.iter().map(|g| g.amount).collect();
        assert_eq!(amounts, vec![5.0, 7.5]);
    }

    #[test]
    fn campaign_detail_for_missing_campaign_is_not_found() {
        let conn = test_connection();
        assert!(matches!(
            get_campaign_detail(&conn, "ghost"),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn my_campaigns_filters_by_creator() {
        let conn = test_connection();
        create_campaign(&conn, sample_campaign("Rex", "a@example.com")).unwrap();
        create_campaign(&conn, sample_campaign("Tom", "b@example.com")).unwrap();

        let mine = list_my_campaigns(&conn, "a@example.com").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].campaign.pet_name, "Rex");
    }

    #[test]
    fn my_donations_group_by_campaign() {
        let conn = test_connection();
        let rex = create_campaign(&conn, sample_campaign("Rex", "c@example.com")).unwrap();
        let tom = create_campaign(&conn, sample_campaign("Tom", "c@example.com")).unwrap();

        record_donation(&conn, &rex.id, donor("d@example.com"), 10.0).unwrap();
        record_donation(&conn, &tom.id, donor("d@example.com"), 3.0).unwrap();
        record_donation(&conn, &rex.id, donor("d@example.com"), 15.0).unwrap();
        record_donation(&conn, &rex.id, donor("other@example.com"), 99.0).unwrap();

        let mine = list_my_donations(&conn, "d@example.com").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].campaign_id, rex.id);
        assert_eq!(mine[0].pet_name.as_deref(), Some("Rex"));
        assert_eq!(mine[0].total, 25.0);
        assert_eq!(mine[0].donations.len(), 2);
        assert_eq!(mine[1].campaign_id, tom.id);
        assert_eq!(mine[1].total, 3.0);
    }

    #[test]
    fn my_donations_keep_orphaned_gifts() {
        let conn = test_connection();
        let rex = create_campaign(&conn, sample_campaign("Rex", "c@example.com")).unwrap();
        record_donation(&conn, &rex.id, donor("d@example.com"), 10.0).unwrap();
        conn.execute("DELETE FROM donation_campaigns WHERE id = ?1", params![rex.id])
            .unwrap();

        let mine = list_my_donations(&conn, "d@example.com").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].pet_name, None);
        assert_eq!(mine[0].total, 10.0);
    }
}
