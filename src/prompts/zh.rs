use super::PromptSet;

pub static PROMPTS: PromptSet = PromptSet {
    suggest: SUGGEST,
    modify: MODIFY,
    evaluate: EVALUATE,
    chart: CHART,
};

const SUGGEST: &str = r####"你是一位资深的学术综述大纲审稿人。

综述题目为《{title}》，当前大纲如下：

{outline}

该大纲最近一次的评估意见：

{eval_detail}

请针对评估中最薄弱的地方，提出且只提出一条具体的改进建议。可以调整章节结构、合并或拆分章节，或改进某一章节的 Digest Construction / Digest Analysis。
只输出建议本身，不要重写大纲。"####;

const MODIFY: &str = r####"你是一位资深的学术综述大纲编辑。

综述题目为《{title}》。请将以下建议应用到大纲上：

{suggestions}

当前大纲：

{outline}

要求：
- 保持格式："# <综述题目>"，章节写作 "## 1 <标题>"，子章节写作 "### 1.1 <标题>"。
- 每个章节下写 "Digest Construction:" 和 "Digest Analysis:" 两部分。
- 引用文献写作 [bibkey] 或 [bibkey1, bibkey2]，只允许使用以下 bibkey：{bibkeys}
- 不得编造列表之外的 bibkey。

把修改后的完整大纲放在一个 ```markdown 代码块中返回。"####;

const EVALUATE: &str = r####"你是一位严格的学术综述大纲评审。

综述题目为《{title}》。请从覆盖面、逻辑结构、章节均衡和分析深度评估以下大纲：

{outline}

先说明主要优点和不足，最后单独一行输出
Score: <0 到 100 之间的数字>"####;

const CHART: &str = r####"你是一位擅长为学术综述配图的专家。

阅读下面的综述，提出有助于读者理解的图表。示意图使用 mermaid，表格使用 markdown。

{content}

综述的章节标题为：{title_list}

每个图表严格按以下格式输出，章节标题从上面的列表中照抄，定位句从该章节原文中逐字照抄：

Section Title: <章节标题>
Position Sentence: <章节中的一句原文，图表会插在它之前>
Figure Title: <图表标题>
```mermaid
<图表代码>
```
"####;
